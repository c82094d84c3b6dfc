use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("project discovery failed: {0}")]
    ProjectDiscovery(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("classfile error: {0}")]
    ClassFile(#[from] statescan_classfile::Error),
}
