//! Lua-side naming: reserved-word escaping and C# → Lua type-name translation.

// ---------------------------------------------------------------------------
// Reserved words
// ---------------------------------------------------------------------------

/// Lua 5.4 reserved words. None of these can be used as a parameter name or
/// as the key in `T.key = ...`.
pub const LUA_KEYWORDS: &[&str] = &[
    "and", "break", "do", "else", "elseif", "end", "false", "for", "function", "goto", "if", "in",
    "local", "nil", "not", "or", "repeat", "return", "then", "true", "until", "while",
];

pub fn is_lua_keyword(name: &str) -> bool {
    LUA_KEYWORDS.contains(&name)
}

/// Make `name` usable as a Lua identifier by prefixing reserved words with `_`.
pub fn escape_identifier(name: &str) -> String {
    if is_lua_keyword(name) {
        format!("_{name}")
    } else {
        name.to_string()
    }
}

// ---------------------------------------------------------------------------
// Type names
// ---------------------------------------------------------------------------

/// Map a single C# type token to its Lua annotation name, if it is a primitive.
fn primitive_lua_name(token: &str) -> Option<&'static str> {
    let mapped = match token {
        // Integer family
        "sbyte" | "byte" | "short" | "ushort" | "int" | "uint" | "long" | "ulong" | "nint"
        | "nuint" | "char" | "System.SByte" | "System.Byte" | "System.Int16" | "System.UInt16"
        | "System.Int32" | "System.UInt32" | "System.Int64" | "System.UInt64" | "System.IntPtr"
        | "System.UIntPtr" | "System.Char" => "integer",
        // Number family
        "float" | "double" | "decimal" | "System.Single" | "System.Double" | "System.Decimal" => {
            "number"
        }
        "bool" | "System.Boolean" => "boolean",
        "string" | "System.String" => "string",
        "object" | "dynamic" | "System.Object" => "any",
        _ => return None,
    };
    Some(mapped)
}

fn is_token_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

/// Translate a resolver display string into the Lua annotation type name.
///
/// Works token-wise, so composite names keep their shape:
/// `List<int>` → `List<integer>`, `float[]` → `number[]`, `bool?` → `boolean?`.
/// Dotted tokens are only replaced as a whole (`System.Int32` → `integer`), never
/// segment by segment.
pub fn lua_type_name(display: &str) -> String {
    let mut out = String::with_capacity(display.len() + 8);
    let mut token = String::new();

    for c in display.chars() {
        if is_token_char(c) {
            token.push(c);
            continue;
        }
        flush_token(&mut token, &mut out);
        out.push(c);
    }
    flush_token(&mut token, &mut out);
    out
}

fn flush_token(token: &mut String, out: &mut String) {
    if token.is_empty() {
        return;
    }
    match primitive_lua_name(token) {
        Some(lua) => out.push_str(lua),
        None => out.push_str(token),
    }
    token.clear();
}
