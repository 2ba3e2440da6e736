use serde::Deserialize;
use time::Date;

use crate::plans::repo::PlanDay;

#[derive(Debug, Deserialize)]
pub struct SavePlanRequest {
    pub week_start_date: Date,
    pub days: Vec<PlanDay>,
    pub reasoning: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlanQuery {
    pub week_start_date: Option<Date>,
}
