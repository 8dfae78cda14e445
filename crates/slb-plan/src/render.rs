//! Script rendering
//!
//! A [`ScriptRenderer`] turns an action list into the text of one script.
//! Every statement it emits must be idempotent and safe to interrupt between
//! any two lines; the plan builder relies on that to make re-runs harmless.

use crate::action::{Action, ActionPlan};

/// Configuration-store path of the live control set
pub const LIVE_HIVE: &str = r"SYSTEM\CurrentControlSet";

/// Name of the forward script
pub const DISABLE_SCRIPT: &str = "Services-Disable.bat";

/// Name of the rollback script
pub const ENABLE_SCRIPT: &str = "Services-Enable.bat";

/// Renders action lists into script text
pub trait ScriptRenderer: Send + Sync {
    /// Render one complete script, preamble to epilogue
    fn render(&self, actions: &[Action]) -> String;

    /// Render both scripts of a plan
    fn render_plan(&self, plan: &ActionPlan) -> ScriptSet {
        ScriptSet {
            disable: self.render(plan.forward()),
            enable: self.render(plan.rollback()),
        }
    }
}

/// Rendered forward and rollback scripts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSet {
    /// Forward script
    pub disable: String,

    /// Rollback script
    pub enable: String,
}

/// Windows batch renderer
///
/// The preamble picks the target drive (editable at the top of the script),
/// loads that drive's offline `SYSTEM` hive when it isn't the running system
/// and exits with status 1 if the hive can't be reached. Every script ends
/// with a forced restart.
#[derive(Debug, Clone)]
pub struct BatchScriptRenderer {
    version: String,
    drive_letter: char,
}

impl Default for BatchScriptRenderer {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_VERSION"))
    }
}

impl BatchScriptRenderer {
    /// Create renderer stamping scripts with `version`
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            drive_letter: 'C',
        }
    }

    /// With default target drive letter
    #[must_use]
    pub fn with_drive_letter(mut self, letter: char) -> Self {
        self.drive_letter = letter.to_ascii_uppercase();
        self
    }

    fn preamble(&self) -> String {
        format!(
            r#"@echo off
REM This script was built using service-list-builder v{version}
REM Set drive letter to target
set "DRIVE_LETTER={drive}"

if not "%DRIVE_LETTER%" == "C" (
    reg load "tempSYSTEM" "%DRIVE_LETTER%:\Windows\System32\config\SYSTEM"
    if not %errorlevel% == 0 (echo error: failed to load SYSTEM hive && pause && exit /b 1)
    set "HIVE=tempSYSTEM\ControlSet001"
) else (
    set "HIVE={LIVE_HIVE}"
)

reg query "HKLM\%HIVE%" > nul 2>&1 || echo error: hive not exists or is unloaded && pause && exit /b 1

"#,
            version = self.version,
            drive = self.drive_letter,
        )
    }

    /// One statement for one action
    #[must_use]
    pub fn statement(action: &Action) -> String {
        match action {
            Action::SetStartValue { service, value } => format!(
                r#"reg.exe add "HKLM\%HIVE%\Services\{service}" /v "Start" /t REG_DWORD /d "{value}" /f"#
            ),
            Action::SetFilterList {
                class_id,
                kind,
                drivers,
            } => format!(
                r#"reg.exe add "HKLM\%HIVE%\Control\Class\{class_id}" /v "{kind}" /t REG_MULTI_SZ /d "{}" /f"#,
                drivers.join(r"\0")
            ),
            Action::KillProcess { image } => format!("taskkill /f /im {image}"),
            Action::Rename { from, to } => format!(r#"REN "%DRIVE_LETTER%:{from}" "{to}""#),
        }
    }
}

impl ScriptRenderer for BatchScriptRenderer {
    fn render(&self, actions: &[Action]) -> String {
        let mut script = self.preamble();
        for action in actions {
            script.push_str(&Self::statement(action));
            script.push('\n');
        }
        script.push_str("shutdown /r /f /t 0\n");
        script
    }
}
