/// File selection patterns. Case-insensitive `*` and `?` wildcards; a
/// pattern containing `/` is matched against the root-relative path, any
/// other pattern against the bare file name.
pub struct GlobSet {
    patterns: Vec<Pattern>,
}

struct Pattern {
    text: String,
    on_path: bool,
}

impl GlobSet {
    pub fn new(patterns: &[String]) -> Self {
        let patterns = patterns
            .iter()
            .map(|p| {
                let text = p.replace('\\', "/");
                let text = text.strip_prefix("./").unwrap_or(&text).to_owned();
                Pattern {
                    on_path: text.contains('/'),
                    text,
                }
            })
            .collect();
        Self { patterns }
    }

    /// `relative` uses `/` separators.
    pub fn is_match(&self, relative: &str, name: &str) -> bool {
        self.patterns.iter().any(|p| {
            let subject = if p.on_path { relative } else { name };
            matches(subject, &p.text)
        })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

pub fn matches(name: &str, pattern: &str) -> bool {
    glob_match(name.as_bytes(), pattern.as_bytes())
}

fn glob_match(name: &[u8], pattern: &[u8]) -> bool {
    let (mut ni, mut pi) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while ni < name.len() {
        match pattern.get(pi) {
            Some(b'*') => {
                backtrack = Some((pi, ni));
                pi += 1;
                continue;
            }
            Some(&p) if p == b'?' || p.eq_ignore_ascii_case(&name[ni]) => {
                pi += 1;
                ni += 1;
                continue;
            }
            _ => {}
        }
        match backtrack {
            // let the last star swallow one more byte
            Some((star_pi, star_ni)) => {
                backtrack = Some((star_pi, star_ni + 1));
                pi = star_pi + 1;
                ni = star_ni + 1;
            }
            None => return false,
        }
    }

    pattern[pi..].iter().all(|&b| b == b'*')
}
