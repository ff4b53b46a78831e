pub const ZIG_INDEX_URL: &str = "https://ziglang.org/download/index.json";
pub const MACH_INDEX_URL: &str = "https://machengine.org/zig/index.json";

pub const ZIG_BASE_DOWNLOAD_URL: &str = "https://ziglang.org/builds/";

pub const ZLS_REPO_URL: &str = "https://github.com/zigtools/zls.git";

/// Subdirectory of the platform cache dir holding both index caches.
pub const CACHE_SUBDIR: &str = "zigup";

pub const ZIG_INDEX_CACHE_FILE: &str = "index-zig.json";
pub const MACH_INDEX_CACHE_FILE: &str = "index-mach.json";

/// Config file name under the platform config dir.
pub const CONFIG_FILE_NAME: &str = "zigup.conf";

/// Env var override for the config file's directory, in the spirit of the
/// teacher's `ZV_DIR` override.
pub const CONFIG_DIR_ENV: &str = "ZIGUP_CONFIG";
