//! Product configuration trait for CLI binaries
//!
//! The binary implements this trait to supply product identity, the default
//! registry location, and the upgrade path shown by `hanma update`.

/// Configuration trait for the CLI product
///
/// Implementations define:
/// - Product identity (name, display name)
/// - Default registry base URL
/// - Documentation link
/// - Upgrade instructions
pub trait ProductConfig: Clone + Send + Sync + 'static {
    /// Internal product name (used for CLI command, cache dir)
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// Published crate name, used for update checks
    fn crate_name(&self) -> &'static str;

    /// Production base URL; every registry endpoint hangs off it unless overridden
    fn default_base_url(&self) -> &'static str;

    /// CLI description shown in help text
    fn cli_description(&self) -> &'static str;

    /// Upgrade/install command shown in version warnings
    fn upgrade_command(&self) -> &'static str;

    /// User agent string for HTTP requests
    fn user_agent(&self) -> &'static str {
        self.name()
    }
}
