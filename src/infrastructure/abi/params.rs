//! Human-readable ABI parameter parsing
//!
//! Accepts declaration groups such as
//!
//! ```text
//! "uint[] tokenIds, uint[] amount, bytes baseLayer"
//! "struct Order { address maker; (uint256 amount, bool partial)[] fills; }"
//! "Order order, address taker"
//! ```
//!
//! Struct definitions may appear in any group and are visible to all of them.

use std::collections::HashMap;

use alloy_dyn_abi::DynSolType;

use crate::domain::abi::AbiParam;
use crate::engine::DecodeError;

const MODIFIERS: [&str; 4] = ["indexed", "memory", "calldata", "storage"];

/// Parse every declaration group into one ordered parameter list
pub fn parse_declarations(declarations: &[String]) -> Result<Vec<AbiParam>, DecodeError> {
    let mut structs = HashMap::new();
    let mut groups = Vec::with_capacity(declarations.len());

    for declaration in declarations {
        let params = extract_structs(declaration, &mut structs)
            .map_err(|reason| parse_error(declaration, reason))?;
        groups.push((declaration, params));
    }

    let resolver = Resolver { structs: &structs };
    let mut params = Vec::new();
    for (declaration, text) in groups {
        if text.trim().is_empty() {
            continue;
        }
        for param in split_top_level(&text, ',') {
            let param = resolver
                .param(param, &mut Vec::new())
                .map_err(|reason| parse_error(declaration, reason))?;
            params.push(param);
        }
    }

    Ok(params)
}

fn parse_error(declaration: &str, reason: String) -> DecodeError {
    DecodeError::AbiParse {
        declaration: declaration.to_string(),
        reason,
    }
}

/// Pull `struct Name { ... }` definitions out of `declaration`, returning
/// the text that is left.
fn extract_structs(
    declaration: &str,
    structs: &mut HashMap<String, Vec<String>>,
) -> Result<String, String> {
    let mut rest = declaration;
    let mut remaining = String::new();

    while let Some(start) = find_keyword(rest, "struct") {
        remaining.push_str(&rest[..start]);
        let after = &rest[start + "struct".len()..];

        let open = after
            .find('{')
            .ok_or_else(|| "struct definition is missing '{'".to_string())?;
        let name = after[..open].trim();
        if !is_identifier(name) {
            return Err(format!("invalid struct name \"{name}\""));
        }
        let close = after[open..]
            .find('}')
            .map(|offset| open + offset)
            .ok_or_else(|| format!("struct {name} is missing '}}'"))?;

        let fields: Vec<String> = split_top_level(&after[open + 1..close], ';')
            .into_iter()
            .map(str::trim)
            .filter(|field| !field.is_empty())
            .map(str::to_string)
            .collect();
        if fields.is_empty() {
            return Err(format!("struct {name} has no fields"));
        }
        if structs.insert(name.to_string(), fields).is_some() {
            return Err(format!("struct {name} is declared more than once"));
        }

        rest = &after[close + 1..];
    }

    remaining.push_str(rest);
    Ok(remaining)
}

struct Resolver<'a> {
    structs: &'a HashMap<String, Vec<String>>,
}

impl Resolver<'_> {
    /// `<type> [modifier] [name]`; `stack` holds the structs being resolved
    fn param(&self, text: &str, stack: &mut Vec<String>) -> Result<AbiParam, String> {
        let text = text.trim();
        if text.is_empty() {
            return Err("empty parameter".to_string());
        }

        let (type_text, rest) = split_type(text)?;
        let mut words = rest
            .split_whitespace()
            .filter(|word| !MODIFIERS.contains(word));
        let name = words.next().map(str::to_string);
        if let Some(extra) = words.next() {
            return Err(format!("unexpected \"{extra}\" in \"{text}\""));
        }
        if let Some(name) = name.as_deref() {
            if !is_identifier(name) {
                return Err(format!("invalid parameter name \"{name}\""));
            }
        }

        let (base, suffixes) = split_array_suffixes(type_text)?;
        let (ty, components) = self.base_type(base, stack)?;
        let ty = suffixes.iter().try_fold(ty, |ty, suffix| apply_suffix(ty, suffix))?;

        Ok(AbiParam {
            name,
            kind: ty.sol_type_name().into_owned(),
            ty,
            components,
        })
    }

    fn base_type(
        &self,
        base: &str,
        stack: &mut Vec<String>,
    ) -> Result<(DynSolType, Vec<AbiParam>), String> {
        let inner = base
            .strip_prefix("tuple")
            .unwrap_or(base)
            .trim()
            .strip_prefix('(')
            .and_then(|inner| inner.strip_suffix(')'));
        if let Some(inner) = inner {
            let components = if inner.trim().is_empty() {
                Vec::new()
            } else {
                split_top_level(inner, ',')
                    .into_iter()
                    .map(|component| self.param(component, stack))
                    .collect::<Result<Vec<_>, _>>()?
            };
            return Ok(tuple_of(components));
        }

        if let Some(fields) = self.structs.get(base) {
            if stack.iter().any(|name| name == base) {
                return Err(format!("struct {base} refers to itself"));
            }
            stack.push(base.to_string());
            let components = fields
                .iter()
                .map(|field| self.param(field, stack))
                .collect::<Result<Vec<_>, _>>()?;
            stack.pop();
            return Ok(tuple_of(components));
        }

        let normalized = match base {
            "uint" => "uint256",
            "int" => "int256",
            other => other,
        };
        let ty = DynSolType::parse(normalized)
            .map_err(|err| format!("unknown type \"{base}\": {err}"))?;
        if matches!(ty, DynSolType::Tuple(_)) {
            return Err(format!("unknown type \"{base}\""));
        }
        Ok((ty, Vec::new()))
    }
}

fn tuple_of(components: Vec<AbiParam>) -> (DynSolType, Vec<AbiParam>) {
    let ty = DynSolType::Tuple(components.iter().map(|param| param.ty.clone()).collect());
    (ty, components)
}

fn apply_suffix(ty: DynSolType, suffix: &str) -> Result<DynSolType, String> {
    let size = suffix.trim();
    if size.is_empty() {
        return Ok(DynSolType::Array(Box::new(ty)));
    }
    let size: usize = size
        .parse()
        .map_err(|_| format!("invalid array size \"{size}\""))?;
    Ok(DynSolType::FixedArray(Box::new(ty), size))
}

/// Split the leading type off a parameter, e.g. `"(uint a, bool b)[] xs"`
/// gives `("(uint a, bool b)[]", " xs")`
fn split_type(text: &str) -> Result<(&str, &str), String> {
    let mut depth = 0usize;
    for (index, c) in text.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| format!("unbalanced brackets in \"{text}\""))?;
            }
            c if c.is_whitespace() && depth == 0 => return Ok((&text[..index], &text[index..])),
            _ => {}
        }
    }
    if depth != 0 {
        return Err(format!("unbalanced brackets in \"{text}\""));
    }
    Ok((text, ""))
}

/// `"uint256[][3]"` gives `("uint256", ["", "3"])`
fn split_array_suffixes(type_text: &str) -> Result<(&str, Vec<&str>), String> {
    let mut base = type_text;
    let mut suffixes = Vec::new();

    while let Some(stripped) = base.strip_suffix(']') {
        let open = stripped
            .rfind('[')
            .ok_or_else(|| format!("unbalanced brackets in \"{type_text}\""))?;
        // a ')' after the '[' means the bracket belongs to a tuple component
        if stripped[open..].contains(')') {
            break;
        }
        suffixes.push(&stripped[open + 1..]);
        base = &stripped[..open];
    }

    suffixes.reverse();
    Ok((base.trim(), suffixes))
}

/// Split on `separator` outside of brackets and braces
fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;

    for (index, c) in text.char_indices() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            c if c == separator && depth == 0 => {
                parts.push(&text[start..index]);
                start = index + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Byte offset of `keyword` as a whole word
fn find_keyword(text: &str, keyword: &str) -> Option<usize> {
    let mut offset = 0;
    while let Some(found) = text[offset..].find(keyword) {
        let start = offset + found;
        let end = start + keyword.len();
        let before = text[..start].chars().next_back();
        let after = text[end..].chars().next();
        let boundary = |c: Option<char>| c.is_none_or(|c| !is_identifier_char(c));
        if boundary(before) && boundary(after) {
            return Some(start);
        }
        offset = end;
    }
    None
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(is_identifier_char)
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(declarations: &[&str]) -> Result<Vec<AbiParam>, DecodeError> {
        let declarations: Vec<String> = declarations.iter().map(|d| d.to_string()).collect();
        parse_declarations(&declarations)
    }

    fn kinds(params: &[AbiParam]) -> Vec<&str> {
        params.iter().map(|param| param.kind.as_str()).collect()
    }

    #[test]
    fn test_grouped_params() {
        let params = parse(&["uint[] tokenIds, uint[] amount, bytes baseLayer, bytes execLayer"])
            .unwrap();
        assert_eq!(
            kinds(&params),
            vec!["uint256[]", "uint256[]", "bytes", "bytes"]
        );
        assert_eq!(params[0].declared_name(), Some("tokenIds"));
        assert_eq!(params[3].declared_name(), Some("execLayer"));
    }

    #[test]
    fn test_unnamed_and_modifiers() {
        let params = parse(&["address, bytes memory data", "uint8[3] indexed"]).unwrap();
        assert_eq!(kinds(&params), vec!["address", "bytes", "uint8[3]"]);
        assert_eq!(params[0].name, None);
        assert_eq!(params[1].declared_name(), Some("data"));
    }

    #[test]
    fn test_inline_tuple() {
        let params = parse(&["(uint256 id, address owner)[] items, tuple(bool, string) flags"])
            .unwrap();
        assert_eq!(kinds(&params), vec!["(uint256,address)[]", "(bool,string)"]);
        assert_eq!(params[0].components.len(), 2);
        assert_eq!(params[0].components[1].declared_name(), Some("owner"));
    }

    #[test]
    fn test_struct_declared_separately() {
        let params = parse(&[
            "struct Fill { uint amount; bool partial; }",
            "struct Order { address maker; Fill[] fills; }",
            "Order order, uint nonce",
        ])
        .unwrap();

        assert_eq!(
            kinds(&params),
            vec!["(address,(uint256,bool)[])", "uint256"]
        );
        let order = &params[0];
        assert_eq!(order.components[0].declared_name(), Some("maker"));
        assert_eq!(order.components[1].components[1].declared_name(), Some("partial"));
    }

    #[test]
    fn test_struct_inline_with_params() {
        let params = parse(&["struct Point { int x; int y; } Point from, Point to"]).unwrap();
        assert_eq!(kinds(&params), vec!["(int256,int256)", "(int256,int256)"]);
    }

    #[test]
    fn test_self_referencing_struct() {
        let err = parse(&["struct Node { Node next; }", "Node head"]).unwrap_err();
        assert!(err.to_string().contains("refers to itself"));
    }

    #[test]
    fn test_malformed_declarations() {
        for bad in [
            "uint256 a b",
            "foo bar",
            "uint256 a,,uint256 b",
            "(uint256 a",
            "uint256[x] a",
            "struct { uint a; }",
            "uint256 1a",
        ] {
            let err = parse(&[bad]).unwrap_err();
            assert!(
                matches!(&err, DecodeError::AbiParse { declaration, .. } if declaration == bad),
                "{bad}: {err}"
            );
        }
    }

    #[test]
    fn test_struct_only_declaration_has_no_params() {
        assert!(parse(&["struct A { uint a; }"]).unwrap().is_empty());
        assert!(parse(&[]).unwrap().is_empty());
    }
}
