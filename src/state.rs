use crate::models::AppData;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub data: Arc<Mutex<AppData>>,
    pub page_size: u64,
}

impl AppState {
    pub fn new(data_path: PathBuf, data: AppData, page_size: u64) -> Self {
        Self {
            data_path,
            data: Arc::new(Mutex::new(data)),
            page_size: page_size.max(1),
        }
    }
}
