/// Prefix for environment overrides (`SBOX__SERVER__PORT=9000`).
pub const ENV_PREFIX: &str = "SBOX";
/// Plain port override kept for container platforms that inject `PORT`.
pub const PORT_ENV: &str = "PORT";
/// Default configuration file stem, resolved relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "shutterbox";

pub const DEFAULT_PORT: u16 = 8080;
pub const PICTURES_DIR: &str = "pictures";

/// 15 MiB.
pub const MAX_FILE_SIZE: u64 = 15 * 1024 * 1024;
/// Bytes, matching the common `NAME_MAX` of POSIX filesystems.
pub const MAX_FILENAME_LENGTH: usize = 255;
pub const MAX_COLLISION_ATTEMPTS: u32 = 10_000;
pub const DEFAULT_UPLOAD_NAME: &str = "upload.jpg";
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

pub const INDEX_PAGE: &str = "index.html";
pub const SLIDESHOW_PAGE: &str = "slideshow.html";
pub const FAVICON: &str = "favicon.ico";
