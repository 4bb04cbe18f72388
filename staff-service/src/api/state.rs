use std::sync::Arc;

use crate::domain::service::StaffService;

pub struct StaffAppState {
    pub staff_service: Arc<StaffService>,
}
