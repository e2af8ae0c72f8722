//! Field and method descriptor parsing (JVMS 4.3.2, 4.3.3).
//!
//! Descriptors are the type encoding `.class` files use in place of source
//! syntax; the binder's classpath view decodes them to stand in for the
//! field types and method signatures a `TypeBound` class would otherwise get
//! from parsed source.

use crate::model::{FieldDescriptor, MethodDescriptor, PrimitiveKind};

pub fn parse_field_descriptor(s: &str) -> Option<FieldDescriptor> {
    let mut chars = s.chars().peekable();
    let result = parse_field_descriptor_chars(&mut chars)?;
    if chars.next().is_some() {
        return None;
    }
    Some(result)
}

fn parse_field_descriptor_chars(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
) -> Option<FieldDescriptor> {
    match chars.next()? {
        'B' => Some(FieldDescriptor::Base(PrimitiveKind::Byte)),
        'C' => Some(FieldDescriptor::Base(PrimitiveKind::Char)),
        'D' => Some(FieldDescriptor::Base(PrimitiveKind::Double)),
        'F' => Some(FieldDescriptor::Base(PrimitiveKind::Float)),
        'I' => Some(FieldDescriptor::Base(PrimitiveKind::Int)),
        'J' => Some(FieldDescriptor::Base(PrimitiveKind::Long)),
        'S' => Some(FieldDescriptor::Base(PrimitiveKind::Short)),
        'Z' => Some(FieldDescriptor::Base(PrimitiveKind::Boolean)),
        'L' => {
            let mut name = String::new();
            for c in chars.by_ref() {
                if c == ';' {
                    return Some(FieldDescriptor::Object(name));
                }
                name.push(c);
            }
            None
        }
        '[' => {
            let component = parse_field_descriptor_chars(chars)?;
            Some(FieldDescriptor::Array(Box::new(component)))
        }
        _ => None,
    }
}

pub fn parse_method_descriptor(s: &str) -> Option<MethodDescriptor> {
    let mut chars = s.chars().peekable();
    if chars.next()? != '(' {
        return None;
    }
    let mut params = Vec::new();
    loop {
        match chars.peek()? {
            ')' => {
                chars.next();
                break;
            }
            _ => params.push(parse_field_descriptor_chars(&mut chars)?),
        }
    }
    let return_type = if chars.peek() == Some(&'V') {
        chars.next();
        None
    } else {
        Some(parse_field_descriptor_chars(&mut chars)?)
    };
    if chars.next().is_some() {
        return None;
    }
    Some(MethodDescriptor { params, return_type })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_primitive_field_descriptor() {
        assert_eq!(parse_field_descriptor("I"), Some(FieldDescriptor::Base(PrimitiveKind::Int)));
    }

    #[test]
    fn parses_object_field_descriptor() {
        assert_eq!(
            parse_field_descriptor("Ljava/lang/String;"),
            Some(FieldDescriptor::Object("java/lang/String".into()))
        );
    }

    #[test]
    fn parses_nested_array_descriptor() {
        assert_eq!(
            parse_field_descriptor("[[I"),
            Some(FieldDescriptor::Array(Box::new(FieldDescriptor::Array(Box::new(
                FieldDescriptor::Base(PrimitiveKind::Int)
            )))))
        );
    }

    #[test]
    fn parses_method_descriptor_with_mixed_params() {
        let desc = parse_method_descriptor("(ILjava/lang/String;[B)Z").unwrap();
        assert_eq!(desc.params.len(), 3);
        assert_eq!(desc.params[0], FieldDescriptor::Base(PrimitiveKind::Int));
        assert_eq!(desc.params[1], FieldDescriptor::Object("java/lang/String".into()));
        assert_eq!(
            desc.params[2],
            FieldDescriptor::Array(Box::new(FieldDescriptor::Base(PrimitiveKind::Byte)))
        );
        assert_eq!(desc.return_type, Some(FieldDescriptor::Base(PrimitiveKind::Boolean)));
    }

    #[test]
    fn parses_void_return() {
        let desc = parse_method_descriptor("()V").unwrap();
        assert!(desc.params.is_empty());
        assert_eq!(desc.return_type, None);
    }
}
