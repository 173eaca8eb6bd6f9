//! Symbol mangling for generated bridge entry points.

/// Replace every character that cannot appear in a C identifier with `_`.
///
/// A leading digit is prefixed with `_` so the result is always a valid
/// identifier. An empty input yields an empty string.
pub fn c_identifier(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Native symbol for a bridge on the `native` platform: `{package}_{function}`.
///
/// Package segments are escaped like JNI names, so `a.b` and `a_b` map to
/// different prefixes.
pub fn native_symbol(package: &str, function: &str) -> String {
    let mut out = String::new();
    for segment in package.split('.').filter(|s| !s.is_empty()) {
        push_jni_escaped(&mut out, segment);
        out.push('_');
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out.push_str(function);
    out
}

/// JNI entry point name for `function` declared in `class` of `package`.
///
/// Follows the JNI short-name scheme: `Java_` followed by the escaped,
/// underscore-joined qualified class name and the escaped method name.
pub fn jni_symbol(package: &str, class: &str, function: &str) -> String {
    let mut out = String::from("Java_");
    for segment in package.split('.').filter(|s| !s.is_empty()) {
        push_jni_escaped(&mut out, segment);
        out.push('_');
    }
    push_jni_escaped(&mut out, class);
    out.push('_');
    push_jni_escaped(&mut out, function);
    out
}

fn push_jni_escaped(out: &mut String, segment: &str) {
    for c in segment.chars() {
        match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' => out.push(c),
            '_' => out.push_str("_1"),
            ';' => out.push_str("_2"),
            '[' => out.push_str("_3"),
            '/' => out.push('_'),
            other => {
                let mut units = [0u16; 2];
                for unit in other.encode_utf16(&mut units) {
                    out.push_str(&format!("_0{unit:04x}"));
                }
            }
        }
    }
}
