// Shared between the launcher binary and `build.rs`/`app::default_pointer::windows` in the
// root crate via `include!`. Keep the two copies byte-identical.

/// Unique byte sequence that locates the spliced target-path buffer inside the
/// compiled launcher executable. Must appear exactly once in the final binary;
/// `build.rs` asserts this at build time.
pub const MARKER: &[u8; 42] = b"!!!THIS MARKS THE zig_exe_string MEMORY!!#";

/// Size of the null-terminated path buffer following the marker, in bytes.
/// Comfortably larger than any platform's MAX_PATH/PATH_MAX.
pub const PATH_BUF_LEN: usize = 32_768;
