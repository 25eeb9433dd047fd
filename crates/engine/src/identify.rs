//! File type identification
//!
//! Assigns the tags that `types`, `types_or` and `exclude_types` filter on.
//! Tags come from the file system (file/directory/symlink, executable bit),
//! a binary sniff of the first kilobyte, the file name or extension, and the
//! shebang line of executable scripts.

use std::collections::BTreeSet;
use std::fs;
use std::io::Read;
use std::path::Path;

/// Tag set for one file
pub type Tags = BTreeSet<&'static str>;

/// Bytes inspected when deciding between text and binary
const SNIFF_LEN: usize = 1024;

/// Extension → tags
const EXTENSIONS: &[(&str, &[&str])] = &[
    ("bash", &["shell", "bash"]),
    ("c", &["c"]),
    ("cc", &["c++"]),
    ("cfg", &["cfg"]),
    ("cpp", &["c++"]),
    ("css", &["css"]),
    ("csv", &["csv"]),
    ("go", &["go"]),
    ("h", &["c"]),
    ("hpp", &["c++"]),
    ("htm", &["html"]),
    ("html", &["html"]),
    ("ini", &["ini"]),
    ("ipynb", &["jupyter", "json"]),
    ("js", &["javascript"]),
    ("json", &["json"]),
    ("jsx", &["javascript", "jsx"]),
    ("markdown", &["markdown"]),
    ("md", &["markdown"]),
    ("py", &["python"]),
    ("pyi", &["pyi"]),
    ("rb", &["ruby"]),
    ("rs", &["rust"]),
    ("rst", &["rst"]),
    ("sh", &["shell"]),
    ("sql", &["sql"]),
    ("svg", &["svg", "xml"]),
    ("toml", &["toml"]),
    ("ts", &["ts"]),
    ("tsx", &["tsx"]),
    ("txt", &["plain-text"]),
    ("xml", &["xml"]),
    ("yaml", &["yaml"]),
    ("yml", &["yaml"]),
    ("zsh", &["shell", "zsh"]),
];

/// Exact file name → tags
const NAMES: &[(&str, &[&str])] = &[
    ("Dockerfile", &["dockerfile"]),
    ("GNUmakefile", &["makefile"]),
    ("Makefile", &["makefile"]),
    ("makefile", &["makefile"]),
    (".bashrc", &["shell", "bash"]),
    (".zshrc", &["shell", "zsh"]),
];

/// Shebang interpreter → tags
const INTERPRETERS: &[(&str, &[&str])] = &[
    ("bash", &["shell", "bash"]),
    ("node", &["javascript"]),
    ("python", &["python"]),
    ("python3", &["python"]),
    ("ruby", &["ruby"]),
    ("sh", &["shell"]),
    ("zsh", &["shell", "zsh"]),
];

/// Tags implied by a file name alone
#[must_use]
pub fn tags_from_filename(path: &Path) -> Tags {
    let mut tags = Tags::new();

    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return tags;
    };

    if let Some((_, found)) = NAMES.iter().find(|(n, _)| *n == name) {
        tags.extend(found.iter().copied());
    }

    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        let ext = ext.to_ascii_lowercase();
        if let Some((_, found)) = EXTENSIONS.iter().find(|(e, _)| *e == ext) {
            tags.extend(found.iter().copied());
        }
    }

    tags
}

/// Tags for a path on disk
///
/// Missing paths get no tags at all, so they never match `types: [file]`.
#[must_use]
pub fn tags_from_path(path: &Path) -> Tags {
    let mut tags = Tags::new();

    let Ok(metadata) = fs::symlink_metadata(path) else {
        return tags;
    };

    let file_type = metadata.file_type();
    if file_type.is_symlink() {
        tags.insert("symlink");
        return tags;
    }
    if file_type.is_dir() {
        tags.insert("directory");
        return tags;
    }

    tags.insert("file");

    let executable = is_executable(&metadata);
    tags.insert(if executable {
        "executable"
    } else {
        "non-executable"
    });

    let head = read_head(path);
    tags.insert(if is_text(&head) { "text" } else { "binary" });

    let by_name = tags_from_filename(path);
    if by_name.is_empty() && executable {
        tags.extend(tags_from_shebang(&head));
    } else {
        tags.extend(by_name);
    }

    tags
}

/// Tags implied by a `#!` line
fn tags_from_shebang(head: &[u8]) -> Tags {
    let mut tags = Tags::new();

    let Some(rest) = head.strip_prefix(b"#!") else {
        return tags;
    };
    let line = String::from_utf8_lossy(rest);
    let line = line.lines().next().unwrap_or_default();

    let mut words = line.split_whitespace();
    let Some(first) = words.next() else {
        return tags;
    };

    // `#!/usr/bin/env python3` names the interpreter in the second word
    let program = if first.ends_with("/env") {
        words.find(|w| !w.starts_with('-')).unwrap_or_default()
    } else {
        first
    };
    let program = program.rsplit('/').next().unwrap_or(program);

    if let Some((_, found)) = INTERPRETERS.iter().find(|(name, _)| *name == program) {
        tags.extend(found.iter().copied());
    }

    tags
}

fn read_head(path: &Path) -> Vec<u8> {
    let mut head = Vec::with_capacity(SNIFF_LEN);
    if let Ok(file) = fs::File::open(path) {
        // Unreadable files are classified from whatever was read
        let _ = file.take(SNIFF_LEN as u64).read_to_end(&mut head);
    }
    head
}

fn is_text(head: &[u8]) -> bool {
    !head.contains(&0)
}

#[cfg(unix)]
fn is_executable(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &fs::Metadata) -> bool {
    false
}
