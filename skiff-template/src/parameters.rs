//! Parameters declared by the bundled templates

pub const IMAGE_URL: &str = "ImageUrl";
pub const SERVICE_NAME: &str = "ServiceName";
pub const COMMAND: &str = "Command";
pub const ENTRY_POINT: &str = "EntryPoint";
pub const WORKING_DIRECTORY: &str = "WorkingDirectory";
pub const MOUNT_DIRECTORY: &str = "EFSMountDirectory";
pub const BUILD_ID: &str = "BUILDID";

/// Failsafe template parameters
pub const STACK_NAME: &str = "StackName";
pub const DELETE_STACK_NAME: &str = "DeleteStackName";
pub const TTL: &str = "TTL";

/// Parameters every job stack is submitted with
pub const RESERVED: [&str; 7] = [
    IMAGE_URL,
    SERVICE_NAME,
    COMMAND,
    ENTRY_POINT,
    WORKING_DIRECTORY,
    MOUNT_DIRECTORY,
    BUILD_ID,
];

/// Whether a key is submitted with every job stack
///
/// Keys a particular base template declares are checked against the parsed
/// [`TemplateDocument`](crate::TemplateDocument).
pub fn is_reserved(key: &str) -> bool {
    RESERVED.contains(&key)
}
