use std::{path::PathBuf, sync::Arc};

use envconfig::Envconfig;
use lazy_static::lazy_static;
use object_store::local::LocalFileSystem;

#[derive(Debug, Envconfig)]
pub struct Config {
    #[envconfig(from = "CONVOY_LOG_LEVEL", default = "info")]
    pub log_level: String,
    //Rows per page when writing containers
    #[envconfig(from = "CONVOY_MAX_PAGE_ROWS", default = "4096")]
    pub max_page_rows: u64,
}

impl Config {
    pub fn init() -> Config {
        Config::init_from_env().expect("Failed to load config")
    }
}

lazy_static! {
    pub static ref CONFIG: Config = Config::init();
    pub static ref DATA_DIR: PathBuf = PathBuf::from("./data/");
    pub static ref OBJECT_STORE_LOCAL_FS: Arc<LocalFileSystem> = {
        std::fs::create_dir_all(DATA_DIR.clone()).expect("Failed to create the data dir");
        Arc::new(LocalFileSystem::new_with_prefix(DATA_DIR.clone())
            .expect("Failed to create local file system. Is the data dir set correctly?"))
    };

    /// The path to the containers directory
    pub static ref CONTAINERS_DIR_PATH: PathBuf = DATA_DIR.join("containers");
    /// The prefix for stored containers for object store paths
    pub static ref CONTAINERS_DIR_PREFIX: object_store::path::Path =
        object_store::path::Path::from("containers");
}
