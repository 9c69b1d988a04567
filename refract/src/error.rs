use facet::Facet;

/// Errors that can occur while diffing two snapshots.
#[derive(Facet, Debug)]
#[facet(derive(Error))]
#[repr(u8)]
pub enum DiffError {
    /// diff timed out after {elapsed_ms}ms (budget {budget_ms}ms)
    TimedOut { budget_ms: u64, elapsed_ms: u64 },

    /// could not resolve {element} in {file}
    UnresolvedInput { file: String, element: String },

    /// model builder failed: {message}
    FrontEnd { message: String },

    /// invalid configuration: {message}
    InvalidConfig { message: String },

    /// serialization failed: {message}
    Serialization { message: String },
}
