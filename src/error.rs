use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Most evidence problems never surface as an `Error`: a malformed line inside an ildasm dump or
/// a build log is skipped where it is found, and an assembly that never receives a full identity
/// simply keeps its unknown version. Only failures that make a whole input unusable are returned
/// to the caller.
///
/// # Error Categories
///
/// ## Evidence Errors
/// - [`Error::Malformed`] - A record matched a leading marker but not its full shape
/// - [`Error::MissingRootProject`] - A build log never announced the project under build
/// - [`Error::ConfigParse`] - A binding-redirect configuration is not well-formed
/// - [`Error::NoInput`] - A required input (files, project descriptor) is absent
///
/// ## I/O and External Errors
/// - [`Error::FileError`] - Filesystem I/O errors
/// - [`Error::Cache`] - The persisted assembly table could not be written or read back
/// - [`Error::Tool`] - An external tool (disassembler, build tool) failed
///
/// # Examples
///
/// ```rust
/// use refscope::{conflicts::{parse_build_output, ConflictParseOptions}, Error};
///
/// match parse_build_output("no project here", &ConflictParseOptions::default()) {
///     Err(Error::MissingRootProject) => println!("log does not name a project"),
///     Err(e) => println!("Other error: {}", e),
///     Ok(graph) => println!("{} nodes", graph.len()),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// A record is damaged and could not be parsed.
    ///
    /// Raised by the strict parsers ([`crate::identity::AssemblyIdentity::parse`],
    /// [`crate::identity::AssemblyVersion::parse`], ...). The lenient ingestion paths recover
    /// from it locally by skipping the offending line.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// The build log never announced the project being built.
    ///
    /// Conflict chains are closed back to the root project, so a log without one cannot be
    /// turned into a rooted graph.
    #[error("Build output does not announce a project (no 'Project \"...csproj\"' line found)")]
    MissingRootProject,

    /// A binding-redirect configuration document is not well-formed.
    #[error("Failed to parse binding redirect configuration - {0}")]
    ConfigParse(String),

    /// A required input is absent.
    ///
    /// Used when a target directory holds no module dumps, or no project descriptor.
    #[error("{0}")]
    NoInput(String),

    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur during file operations
    /// such as reading from disk, permission issues, or filesystem errors.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// The persisted assembly table could not be serialized or deserialized.
    #[error("Assembly table cache error - {0}")]
    Cache(#[from] serde_json::Error),

    /// An external tool could not be run or exited unsuccessfully.
    #[error("External tool failed - {0}")]
    Tool(String),
}

impl From<quick_xml::Error> for Error {
    fn from(error: quick_xml::Error) -> Self {
        Error::ConfigParse(error.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(error: quick_xml::events::attributes::AttrError) -> Self {
        Error::ConfigParse(error.to_string())
    }
}
