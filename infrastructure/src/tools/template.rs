//! Command templates with `{param}` placeholders.
//!
//! Rendering is a single left-to-right pass. A `{name}` whose name is made
//! of ASCII alphanumerics and `_` is a placeholder: it becomes the quoted
//! parameter value, or nothing when the parameter is absent. Any other brace
//! text is copied through untouched, so PowerShell blocks such as
//! `ForEach-Object { $_.Name }` survive rendering.

use actiongate_domain::Params;

/// How substituted values are quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quoting {
    /// Platform shell (`cmd /C` or `sh -c`)
    Shell,
    /// PowerShell single-quoted string literal
    PowerShell,
    /// No quoting (user-facing messages)
    Verbatim,
}

/// How one parameter is inserted, overriding the template's [`Quoting`].
#[derive(Debug, Clone, PartialEq, Eq)]
enum Insert {
    Raw,
    /// Comma-separated items, each trimmed and quoted, joined by spaces
    List,
    /// Quoted value preceded by a flag
    Flag(String),
}

#[derive(Debug, Clone)]
pub struct Template {
    text: String,
    quoting: Quoting,
    inserts: Vec<(String, Insert)>,
    optional: Vec<(String, String)>,
    overrides: Vec<(String, String, String)>,
}

impl Template {
    fn new(text: impl Into<String>, quoting: Quoting) -> Self {
        Self {
            text: text.into(),
            quoting,
            inserts: Vec::new(),
            optional: Vec::new(),
            overrides: Vec::new(),
        }
    }

    /// Command line for the platform shell.
    pub fn shell(text: impl Into<String>) -> Self {
        Self::new(text, Quoting::Shell)
    }

    /// PowerShell script, run through `powershell -NoProfile -Command`.
    pub fn powershell(text: impl Into<String>) -> Self {
        Self::new(text, Quoting::PowerShell)
    }

    /// Plain text, values inserted as-is.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(text, Quoting::Verbatim)
    }

    pub fn quoting(&self) -> Quoting {
        self.quoting
    }

    /// Insert `param` without quoting. For parameters that are themselves
    /// code, such as a PowerShell function call.
    pub fn raw(mut self, param: impl Into<String>) -> Self {
        self.inserts.push((param.into(), Insert::Raw));
        self
    }

    /// Treat `param` as a comma-separated list of separately quoted items.
    pub fn list(mut self, param: impl Into<String>) -> Self {
        self.inserts.push((param.into(), Insert::List));
        self
    }

    /// Render `param` as `prefix` followed by the quoted value, so an absent
    /// optional flag leaves no trace mid-command.
    pub fn flag(mut self, param: impl Into<String>, prefix: impl Into<String>) -> Self {
        self.inserts.push((param.into(), Insert::Flag(prefix.into())));
        self
    }

    /// Append `fragment` (itself rendered) when `param` is present.
    pub fn with_optional(mut self, param: impl Into<String>, fragment: impl Into<String>) -> Self {
        self.optional.push((param.into(), fragment.into()));
        self
    }

    /// Use `text` instead of the main template when `param` equals `value`.
    pub fn when(
        mut self,
        param: impl Into<String>,
        value: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        self.overrides.push((param.into(), value.into(), text.into()));
        self
    }

    /// Whether `placeholder` appears anywhere in the template or its variants.
    pub fn mentions(&self, placeholder: &str) -> bool {
        let needle = format!("{{{}}}", placeholder);
        self.text.contains(&needle)
            || self.optional.iter().any(|(_, f)| f.contains(&needle))
            || self.overrides.iter().any(|(_, _, t)| t.contains(&needle))
    }

    pub fn render(&self, params: &Params) -> String {
        let text = self
            .overrides
            .iter()
            .find(|(param, value, _)| params.get(param) == Some(value))
            .map(|(_, _, text)| text.as_str())
            .unwrap_or(&self.text);

        let mut out = self.substitute(text, params);
        for (param, fragment) in &self.optional {
            if params.contains_key(param) {
                out.push_str(&self.substitute(fragment, params));
            }
        }
        out
    }

    fn substitute(&self, text: &str, params: &Params) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) if is_placeholder(&after[..close]) => {
                    let name = &after[..close];
                    if let Some(value) = params.get(name) {
                        out.push_str(&self.insert(name, value));
                    }
                    rest = &after[close + 1..];
                }
                _ => {
                    out.push('{');
                    rest = after;
                }
            }
        }

        out.push_str(rest);
        out
    }

    fn insert(&self, name: &str, value: &str) -> String {
        let mode = self
            .inserts
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, mode)| mode);

        match mode {
            Some(Insert::Raw) => value.to_string(),
            Some(Insert::List) => value
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(|item| quote(item, self.quoting))
                .collect::<Vec<_>>()
                .join(" "),
            Some(Insert::Flag(prefix)) => format!("{}{}", prefix, quote(value, self.quoting)),
            None => quote(value, self.quoting),
        }
    }
}

impl From<&str> for Template {
    fn from(text: &str) -> Self {
        Template::text(text)
    }
}

impl From<String> for Template {
    fn from(text: String) -> Self {
        Template::text(text)
    }
}

fn is_placeholder(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_plain(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.' || c == '/')
}

/// Quote `value` for the given context. Plain words pass through the shell
/// unquoted; PowerShell values are always literals, since a bare word in
/// expression position would be run as a command.
pub fn quote(value: &str, quoting: Quoting) -> String {
    match quoting {
        Quoting::Verbatim => value.to_string(),
        Quoting::PowerShell => quote_powershell(value),
        Quoting::Shell if is_plain(value) => value.to_string(),
        Quoting::Shell if cfg!(target_os = "windows") => quote_cmd(value),
        Quoting::Shell => quote_sh(value),
    }
}

/// POSIX shell: wrap in single quotes, escape internal single quotes.
fn quote_sh(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len() + 4);
    escaped.push('\'');
    for ch in s.chars() {
        if ch == '\'' {
            escaped.push_str("'\\''");
        } else {
            escaped.push(ch);
        }
    }
    escaped.push('\'');
    escaped
}

/// cmd.exe: wrap in double quotes, escape `"`, `%`, and `!`.
fn quote_cmd(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len() + 4);
    escaped.push('"');
    for ch in s.chars() {
        match ch {
            '"' => escaped.push_str("\\\""),
            '%' => escaped.push_str("%%"),
            '!' => escaped.push_str("^!"),
            _ => escaped.push(ch),
        }
    }
    escaped.push('"');
    escaped
}

/// PowerShell literal string: single quotes, internal `'` doubled.
fn quote_powershell(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_plain_values_are_not_quoted() {
        let t = Template::shell("scoop install {name}");
        assert_eq!(t.render(&params(&[("name", "git")])), "scoop install git");
    }

    #[test]
    fn test_missing_placeholder_renders_empty() {
        let t = Template::shell("choco upgrade {name} -y");
        assert_eq!(t.render(&Params::new()), "choco upgrade  -y");
    }

    #[test]
    fn test_powershell_blocks_survive() {
        let t = Template::powershell(
            "Get-ChildItem -Path {path} -File | ForEach-Object { Write-Output $_.Name }",
        );
        assert_eq!(
            t.render(&params(&[("path", "C:\\Users\\me")])),
            "Get-ChildItem -Path 'C:\\Users\\me' -File | ForEach-Object { Write-Output $_.Name }"
        );
    }

    #[test]
    fn test_nested_braces_with_placeholder_inside() {
        let t = Template::powershell("if ($x) { Stop-Process -Id {target} -Force }");
        assert_eq!(
            t.render(&params(&[("target", "1234")])),
            "if ($x) { Stop-Process -Id '1234' -Force }"
        );
    }

    #[test]
    fn test_powershell_quote_doubles_single_quotes() {
        assert_eq!(quote("it's here", Quoting::PowerShell), "'it''s here'");
    }

    #[test]
    fn test_value_cannot_inject_placeholders() {
        let t = Template::text("{a} and {b}");
        assert_eq!(t.render(&params(&[("a", "{b}"), ("b", "x")])), "{b} and x");
    }

    #[test]
    fn test_sh_quoting() {
        assert_eq!(quote_sh("hello world"), "'hello world'");
        assert_eq!(quote_sh("it's"), "'it'\\''s'");
    }

    #[test]
    fn test_cmd_quoting() {
        assert_eq!(quote_cmd("100% done!"), "\"100%% done^!\"");
        assert_eq!(quote_cmd("say \"hi\""), "\"say \\\"hi\\\"\"");
    }

    #[test]
    fn test_empty_value_is_quoted() {
        assert_eq!(quote("", Quoting::PowerShell), "''");
    }

    #[test]
    fn test_raw_insert() {
        let t = Template::powershell("Import-Module x; {function}").raw("function");
        assert_eq!(
            t.render(&params(&[("function", "OneDrive -Uninstall")])),
            "Import-Module x; OneDrive -Uninstall"
        );
    }

    #[test]
    fn test_list_insert() {
        let t = Template::powershell("uninstall {names} /quiet").list("names");
        assert_eq!(
            t.render(&params(&[("names", "Foo, Bar Baz,,")])),
            "uninstall 'Foo' 'Bar Baz' /quiet"
        );
    }

    #[test]
    fn test_flag_insert() {
        let t = Template::shell("watchexec -w {path}{filter} -- {command}")
            .flag("filter", " -e ")
            .raw("command");
        assert_eq!(
            t.render(&params(&[("path", "src"), ("command", "make")])),
            "watchexec -w src -- make"
        );
        assert_eq!(
            t.render(&params(&[("path", "src"), ("filter", "rs"), ("command", "make")])),
            "watchexec -w src -e rs -- make"
        );
    }

    #[test]
    fn test_optional_fragment() {
        let t = Template::text("Watcher started.").with_optional("filter", " Filter: {filter}");
        assert_eq!(t.render(&Params::new()), "Watcher started.");
        assert_eq!(
            t.render(&params(&[("filter", "*.rs")])),
            "Watcher started. Filter: *.rs"
        );
    }

    #[test]
    fn test_override_by_value() {
        let t = Template::shell("winget upgrade {id}").when("id", "all", "winget upgrade --all");
        assert_eq!(t.render(&params(&[("id", "all")])), "winget upgrade --all");
        assert_eq!(t.render(&params(&[("id", "Git.Git")])), "winget upgrade Git.Git");
    }

    #[test]
    fn test_mentions() {
        let t = Template::powershell("& {tool_path} -Silent");
        assert!(t.mentions("tool_path"));
        assert!(!t.mentions("tool_dir"));
    }
}
