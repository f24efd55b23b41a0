mod cook;
mod helpers;
mod ingredient;
mod recipe;
mod report;

pub(crate) use cook::cmd_cook;
pub(crate) use ingredient::{
    cmd_ingredient_add, cmd_ingredient_delete, cmd_ingredient_list, cmd_ingredient_set,
    cmd_ingredient_toggle,
};
pub(crate) use recipe::{cmd_recipe_clear, cmd_recipe_delete, cmd_recipe_list, cmd_recipe_show};
pub(crate) use report::cmd_report;
