//! Scoped console reporter
//!
//! Every component that prints progress receives a `Reporter` explicitly.
//! A child scope is derived per phase (`Init`, `Build`, `Deploy`, ...), so
//! each printed line carries where it came from:
//!
//! ```text
//! [JAMStack] › [Deploy] › [Create]  ✔  success   edge application
//! ```

use colored::Colorize;

/// Console reporter carrying a scope chain
#[derive(Debug, Clone)]
pub struct Reporter {
    scope: Vec<String>,
}

impl Reporter {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            scope: vec![root.into()],
        }
    }

    /// Derive a reporter one level deeper
    pub fn scope(&self, name: impl Into<String>) -> Self {
        let mut scope = self.scope.clone();
        scope.push(name.into());
        Self { scope }
    }

    /// Scope chain rendered as `[A] › [B]`
    pub fn prefix(&self) -> String {
        self.scope
            .iter()
            .map(|s| format!("[{}]", s))
            .collect::<Vec<_>>()
            .join(" › ")
    }

    fn line(&self, badge: &str, label: &str, message: &str) -> String {
        format!("{}  {}  {:<9} {}", self.prefix().dimmed(), badge, label, message)
    }

    pub fn title(&self, message: &str) {
        println!("{}  🔶  {}", self.prefix().dimmed(), message.yellow().bold());
    }

    pub fn text(&self, message: &str) {
        println!("{}  {}", self.prefix().dimmed(), message);
    }

    pub fn info(&self, message: &str) {
        println!("{}", self.line(&"ℹ".blue().to_string(), &"info".blue().to_string(), message));
    }

    pub fn pending(&self, message: &str) {
        println!(
            "{}",
            self.line(&"···".blue().to_string(), &"awaiting".blue().to_string(), message)
        );
    }

    pub fn success(&self, message: &str) {
        println!(
            "{}",
            self.line(&"✔".green().to_string(), &"success".green().to_string(), message)
        );
    }

    pub fn complete(&self, message: &str) {
        println!(
            "{}",
            self.line(&"☒".cyan().to_string(), &"complete".cyan().to_string(), message)
        );
    }

    pub fn warn(&self, message: &str) {
        println!(
            "{}",
            self.line(&"⚠".yellow().to_string(), &"warning".yellow().to_string(), message)
        );
    }

    pub fn deployed(&self, message: &str) {
        println!(
            "{}",
            self.line("🚀", &"deployed".magenta().to_string(), message)
        );
    }

    pub fn error(&self, message: &str) {
        eprintln!(
            "{}",
            self.line(&"✖".red().to_string(), &"error".red().to_string(), &message.red().to_string())
        );
    }

    /// `[n/total] - message` step label used by multi-step sequences
    pub fn step(n: usize, total: usize, message: &str) -> String {
        format!("[{}/{}] - {}", n, total, message)
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new("JAMStack")
    }
}
