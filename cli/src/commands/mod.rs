mod dashboard;
mod helpers;
mod logs;
mod meal;

pub(crate) use dashboard::cmd_dashboard;
pub(crate) use logs::{LogsQuery, cmd_logs};
pub(crate) use meal::{MealFields, cmd_add, cmd_delete, cmd_edit, cmd_show};
