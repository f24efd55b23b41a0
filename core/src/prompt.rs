const BASE_PROMPT: &str = "Give me one cooking recipe.";

/// Compose the generation prompt from a free-text style and the on-hand ingredient names.
///
/// ```
/// use pantry_core::prompt::build_prompt;
///
/// assert_eq!(
///     build_prompt("spicy", &["carrot", "onion"]),
///     "Give me one cooking recipe. I want something spicy. The only ingredients I have are carrot, onion."
/// );
/// ```
#[must_use]
pub fn build_prompt<S: AsRef<str>>(style: &str, on_hand: &[S]) -> String {
    let mut prompt = BASE_PROMPT.to_string();

    let style = style.trim();
    if !style.is_empty() {
        prompt.push_str(&format!(" I want something {style}."));
    }

    if !on_hand.is_empty() {
        let names: Vec<&str> = on_hand.iter().map(AsRef::as_ref).collect();
        prompt.push_str(&format!(
            " The only ingredients I have are {}.",
            names.join(", ")
        ));
    }

    prompt
}
