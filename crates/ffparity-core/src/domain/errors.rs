use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ParityResult<T> = Result<T, ParityError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParityErrorCategory {
    Success,
    ComparisonFailure,
    InputValidationError,
    IoSystemError,
    InternalError,
}

impl ParityErrorCategory {
    pub const fn exit_class(self) -> ExitClass {
        match self {
            Self::Success => ExitClass {
                exit_code: 0,
                category_name: "Success",
            },
            Self::ComparisonFailure => ExitClass {
                exit_code: 1,
                category_name: "ComparisonFailure",
            },
            Self::InputValidationError => ExitClass {
                exit_code: 2,
                category_name: "InputValidationError",
            },
            Self::IoSystemError => ExitClass {
                exit_code: 3,
                category_name: "IoSystemError",
            },
            Self::InternalError => ExitClass {
                exit_code: 5,
                category_name: "InternalError",
            },
        }
    }

    pub const fn exit_code(self) -> i32 {
        self.exit_class().exit_code
    }

    pub const fn category_name(self) -> &'static str {
        self.exit_class().category_name
    }

    /// Category of a run that completed: every comparison passed, or some
    /// comparison found a difference.
    pub const fn from_verdict(passed: bool) -> Self {
        if passed {
            Self::Success
        } else {
            Self::ComparisonFailure
        }
    }

    pub const fn is_fatal(self) -> bool {
        !matches!(self, Self::Success | Self::ComparisonFailure)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitClass {
    pub exit_code: i32,
    pub category_name: &'static str,
}

/// Run-level failure: something that prevents a comparison from being
/// attempted at all, as opposed to a comparison that ran and disagreed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParityError {
    category: ParityErrorCategory,
    placeholder: &'static str,
    message: String,
}

impl ParityError {
    pub fn new(
        category: ParityErrorCategory,
        placeholder: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            placeholder,
            message: message.into(),
        }
    }

    pub fn input_validation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(
            ParityErrorCategory::InputValidationError,
            placeholder,
            message,
        )
    }

    pub fn io_system(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(ParityErrorCategory::IoSystemError, placeholder, message)
    }

    pub fn internal(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(ParityErrorCategory::InternalError, placeholder, message)
    }

    pub const fn category(&self) -> ParityErrorCategory {
        self.category
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        let severity = if self.category.is_fatal() {
            "ERROR"
        } else {
            "INFO"
        };
        format!("{}: [{}] {}", severity, self.placeholder, self.message)
    }

    pub fn fatal_exit_line(&self) -> Option<String> {
        self.category
            .is_fatal()
            .then(|| format!("FATAL EXIT CODE: {}", self.exit_code()))
    }
}

impl Display for ParityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category.category_name(),
            self.placeholder,
            self.message
        )
    }
}

impl Error for ParityError {}
