//! Figures shown on the dashboard landing view.

use anyhow::Context;
use clinic_auth::StaffDirectory;
use clinic_core::repository::{PatientRepository, ProfileStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardSummary {
    pub patient_count: u64,
    pub staff_count: u64,
}

pub async fn summarize<R, P>(
    patients: &R,
    staff: &StaffDirectory<P>,
) -> anyhow::Result<DashboardSummary>
where
    R: PatientRepository,
    P: ProfileStore,
{
    let patient_count = patients.count().await.context("counting patients")?;
    let staff_count = staff.count().await.context("counting staff")?;
    Ok(DashboardSummary {
        patient_count,
        staff_count,
    })
}
