use anyhow::Result;
use std::sync::Arc;

use pantry_core::{Error, PantryService};

use crate::config::Config;
use crate::functions::CallableFunctionsClient;

use super::helpers::exit_not_found;

pub(crate) async fn cmd_report(
    svc: &PantryService,
    config: &Config,
    recipe_id: i64,
    reason: Option<&str>,
    json: bool,
) -> Result<()> {
    let client = CallableFunctionsClient::new(&config.functions_url()?)?;
    let reports = svc.reports(Arc::new(client));

    let outcome = match svc
        .report_recipe(&reports, recipe_id, reason.unwrap_or_default())
        .await
    {
        Ok(outcome) => outcome,
        Err(e @ Error::NotFound { .. }) => exit_not_found(&e.to_string(), json),
        Err(e) => return Err(e.into()),
    };

    match outcome {
        Ok(receipt) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&receipt)?);
            } else {
                match &receipt.report_id {
                    Some(report_id) => {
                        println!("Reported recipe {recipe_id} (report id: {report_id})");
                    }
                    None => println!("Reported recipe {recipe_id}"),
                }
            }
            Ok(())
        }
        Err(e) => {
            if json {
                println!("{}", serde_json::json!({ "error": e.to_string(), "reported": false }));
                std::process::exit(1);
            }
            Err(e.into())
        }
    }
}
