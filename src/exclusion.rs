const DEFAULT_EXCLUSIONS: &[&str] = &[
    ".git", ".hg", ".svn", ".idea", ".vscode", ".cache",
    "node_modules", "target", "out", "dist", "build", "coverage",
];

/// Directory names never descended into. Comparison ignores ASCII case.
pub struct ExclusionFilter {
    exclusions: Vec<String>,
}

impl ExclusionFilter {
    pub fn new(additional: &[String], disable_defaults: bool) -> Self {
        let mut exclusions: Vec<String> = Vec::new();
        if !disable_defaults {
            exclusions.extend(DEFAULT_EXCLUSIONS.iter().map(|&name| name.to_owned()));
        }
        for name in additional {
            if !exclusions.iter().any(|e| e.eq_ignore_ascii_case(name)) {
                exclusions.push(name.clone());
            }
        }
        Self { exclusions }
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.exclusions.iter().any(|e| e.eq_ignore_ascii_case(name))
    }
}
