//! Terminal and JSON rendering

use colored::*;
use errors::{ErrorInfo, MasterCalcError, MasterCalcErrorTrait};
use mastercalc_calc::{CalcError, Calculation};
use mastercalc_store::StoreError;
use serde::Serialize;
use tracing::debug;

/// Output mode chosen by `--json`
#[derive(Debug, Clone, Copy)]
pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    /// Print any serializable value as pretty JSON
    pub fn json<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// Calculation result: title, display lines, or the whole record as JSON
    pub fn calculation<T: Serialize>(
        &self,
        title: &str,
        calc: &Calculation<T>,
    ) -> anyhow::Result<()> {
        if self.json {
            return self.json(calc);
        }
        println!("{}", title.bright_cyan().bold());
        for line in calc.display.lines() {
            println!("  {}", line);
        }
        Ok(())
    }

    pub fn heading(&self, text: &str) {
        if !self.json {
            println!("{}", text.bright_cyan().bold());
        }
    }

    pub fn success(&self, text: &str) {
        if !self.json {
            println!("{} {}", "OK".green(), text);
        }
    }

    pub fn info(&self, text: &str) {
        if !self.json {
            println!("{}", text);
        }
    }

    pub fn warn(&self, text: &str) {
        if !self.json {
            println!("{} {}", "WARN".yellow(), text);
        }
    }

    /// Placeholder shown for empty lists
    pub fn empty(&self, text: &str) {
        if !self.json {
            println!("{}", text.dimmed());
        }
    }

    /// Report an error inline and return the process exit code
    pub fn error(&self, err: &anyhow::Error) -> i32 {
        let (info, code) = describe(err);
        if self.json {
            match serde_json::to_string_pretty(&ErrorReport { error: &info }) {
                Ok(text) => println!("{}", text),
                Err(_) => eprintln!("{}", info.message),
            }
        } else {
            eprintln!("{} {}", "ERROR".red(), info.message);
            if let Some(details) = &info.details {
                if details != &info.message {
                    eprintln!("      {}", details.dimmed());
                }
            }
        }
        code
    }
}

#[derive(Serialize)]
struct ErrorReport<'a> {
    error: &'a ErrorInfo,
}

/// Error report and exit code for anything a command can fail with
fn describe(err: &anyhow::Error) -> (ErrorInfo, i32) {
    fn report<E: MasterCalcErrorTrait>(e: &E) -> (ErrorInfo, i32) {
        debug!(code = e.error_code(), level = %e.log_level(), "{}", e);
        (e.to_error_info(), e.exit_code())
    }

    if let Some(e) = err.downcast_ref::<CalcError>() {
        report(e)
    } else if let Some(e) = err.downcast_ref::<StoreError>() {
        report(e)
    } else if let Some(e) = err.downcast_ref::<MasterCalcError>() {
        report(e)
    } else {
        let info = ErrorInfo::new(err.to_string()).with_details(format!("{:#}", err));
        (info, 1)
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_describe_calc_error() {
        let err = anyhow::Error::new(CalcError::division_by_zero("resistance"));
        let (info, code) = describe(&err);
        assert_eq!(code, 2);
        assert_eq!(info.code, "DIVISION_BY_ZERO");
    }

    #[test]
    fn test_describe_store_error() {
        let err = anyhow::Error::new(StoreError::EmptyTemplateName);
        let (info, code) = describe(&err);
        assert_eq!(code, 2);
        assert_eq!(info.message, "Название шаблона не может быть пустым");
    }

    #[test]
    fn test_describe_other_error() {
        let err = anyhow::anyhow!("boom");
        let (info, code) = describe(&err);
        assert_eq!(code, 1);
        assert_eq!(info.message, "boom");
    }
}
