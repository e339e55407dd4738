//! File contents written by the integration steps
//!
//! Freedesktop `.desktop` entries on Linux; on Windows the PowerShell
//! invocation that saves a `.lnk` shortcut plus the batch/VBScript pair used
//! for hidden autostart.

use std::fmt::Write as _;
use std::path::Path;

use crate::config::PackageConfig;
use crate::host::CommandSpec;

use super::assets::IconRef;

/// A freedesktop desktop entry for the application
#[derive(Debug, Clone)]
pub struct DesktopEntry<'a> {
    pub package: &'a PackageConfig,
    pub exec: &'a CommandSpec,
    pub icon: &'a IconRef,
    pub autostart: bool,
}

impl DesktopEntry<'_> {
    pub fn render(&self) -> String {
        let mut out = String::from("[Desktop Entry]\n");
        let _ = writeln!(out, "Type=Application");
        let _ = writeln!(out, "Name={}", self.package.display_name);
        let _ = writeln!(out, "Comment={}", self.package.comment);
        let _ = writeln!(out, "Exec={}", exec_field(self.exec));
        let _ = writeln!(out, "Icon={}", self.icon);
        let _ = writeln!(out, "Terminal=false");
        if !self.package.categories.is_empty() {
            let _ = writeln!(out, "Categories={};", self.package.categories.join(";"));
        }
        let _ = writeln!(out, "StartupNotify=false");
        if self.autostart {
            let _ = writeln!(out, "X-GNOME-Autostart-enabled=true");
        }
        out
    }
}

/// Render a command as a desktop entry `Exec` value
pub fn exec_field(command: &CommandSpec) -> String {
    std::iter::once(command.program.as_str())
        .chain(command.args.iter().map(String::as_str))
        .map(exec_token)
        .collect::<Vec<_>>()
        .join(" ")
}

fn exec_token(token: &str) -> String {
    const RESERVED: &[char] = &[
        ' ', '\t', '\n', '"', '\'', '\\', '>', '<', '~', '|', '&', ';', '$', '*', '?', '#', '(',
        ')', '`',
    ];
    if !token.is_empty() && !token.contains(RESERVED) {
        return token.replace('%', "%%");
    }
    let mut quoted = String::from("\"");
    for c in token.chars() {
        match c {
            '"' | '`' | '$' | '\\' => {
                quoted.push('\\');
                quoted.push(c);
            }
            '%' => quoted.push_str("%%"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Single-quoted PowerShell string literal
fn ps_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Join arguments the way `CommandLineToArgvW` splits them back
fn windows_arguments(args: &[String]) -> String {
    args.iter()
        .map(|arg| {
            if arg.is_empty() || arg.contains([' ', '\t', '"']) {
                format!("\"{}\"", arg.replace('"', "\\\""))
            } else {
                arg.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// PowerShell command saving a `.lnk` at `link` that starts `target`
pub fn windows_shortcut(
    link: &Path,
    target: &CommandSpec,
    icon: &IconRef,
    description: &str,
) -> CommandSpec {
    let script = format!(
        "$s = (New-Object -ComObject WScript.Shell).CreateShortcut({link}); \
         $s.TargetPath = {target}; \
         $s.Arguments = {arguments}; \
         $s.IconLocation = {icon}; \
         $s.Description = {description}; \
         $s.Save()",
        link = ps_literal(&link.display().to_string()),
        target = ps_literal(&target.program),
        arguments = ps_literal(&windows_arguments(&target.args)),
        icon = ps_literal(&icon.to_string()),
        description = ps_literal(description),
    );
    CommandSpec::new("powershell").args(["-NoProfile", "-NonInteractive", "-Command"]).arg(script)
}

/// Batch file that starts the application
pub fn autostart_batch(command: &CommandSpec) -> String {
    let program = if command.program.contains(' ') {
        format!("\"{}\"", command.program)
    } else {
        command.program.clone()
    };
    let mut line = program;
    if !command.args.is_empty() {
        line.push(' ');
        line.push_str(&windows_arguments(&command.args));
    }
    format!("@echo off\r\n{line}\r\n")
}

/// VBScript that runs `batch` without a console window
pub fn hidden_launcher(batch: &Path) -> String {
    format!(
        "CreateObject(\"Wscript.Shell\").Run \"\"\"{}\"\"\", 0, False\r\n",
        batch.display()
    )
}
