use std::fmt;

#[derive(Debug, Clone)]
pub enum SamplerError {
    Config(String),
    InvalidInstrumentationKey(String),
    Validation(String),
    Export(String),
    Format(String),
    InvalidState(String),
    Terminal(String),
    FileOperation(String),
    Serialization(String),
}

impl SamplerError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            SamplerError::Config(_) => "E001",
            SamplerError::InvalidInstrumentationKey(_) => "E002",
            SamplerError::Validation(_) => "E003",
            SamplerError::Export(_) => "E004",
            SamplerError::Format(_) => "E005",
            SamplerError::InvalidState(_) => "E006",
            SamplerError::Terminal(_) => "E007",
            SamplerError::FileOperation(_) => "E008",
            SamplerError::Serialization(_) => "E009",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            SamplerError::Config(_) => "Configuration Error",
            SamplerError::InvalidInstrumentationKey(_) => "Invalid Instrumentation Key",
            SamplerError::Validation(_) => "Validation Error",
            SamplerError::Export(_) => "Export Error",
            SamplerError::Format(_) => "Format Error",
            SamplerError::InvalidState(_) => "Invalid State",
            SamplerError::Terminal(_) => "Terminal Error",
            SamplerError::FileOperation(_) => "File Operation Error",
            SamplerError::Serialization(_) => "Serialization Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            SamplerError::Config(msg) => msg,
            SamplerError::InvalidInstrumentationKey(msg) => msg,
            SamplerError::Validation(msg) => msg,
            SamplerError::Export(msg) => msg,
            SamplerError::Format(msg) => msg,
            SamplerError::InvalidState(msg) => msg,
            SamplerError::Terminal(msg) => msg,
            SamplerError::FileOperation(msg) => msg,
            SamplerError::Serialization(msg) => msg,
        }
    }

    /// Errors that must abort startup before any background task runs.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SamplerError::Config(_)
                | SamplerError::InvalidInstrumentationKey(_)
                | SamplerError::Validation(_)
        )
    }

    /// 格式化为彩色输出
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for SamplerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for SamplerError {}

// 便捷的构造函数
impl SamplerError {
    pub fn config<T: Into<String>>(msg: T) -> Self {
        SamplerError::Config(msg.into())
    }

    pub fn invalid_instrumentation_key<T: Into<String>>(msg: T) -> Self {
        SamplerError::InvalidInstrumentationKey(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        SamplerError::Validation(msg.into())
    }

    pub fn export<T: Into<String>>(msg: T) -> Self {
        SamplerError::Export(msg.into())
    }

    pub fn format<T: Into<String>>(msg: T) -> Self {
        SamplerError::Format(msg.into())
    }

    pub fn invalid_state<T: Into<String>>(msg: T) -> Self {
        SamplerError::InvalidState(msg.into())
    }

    pub fn terminal<T: Into<String>>(msg: T) -> Self {
        SamplerError::Terminal(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        SamplerError::FileOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        SamplerError::Serialization(msg.into())
    }
}

impl From<std::io::Error> for SamplerError {
    fn from(err: std::io::Error) -> Self {
        SamplerError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for SamplerError {
    fn from(err: serde_json::Error) -> Self {
        SamplerError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for SamplerError {
    fn from(err: config::ConfigError) -> Self {
        SamplerError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SamplerError>;
