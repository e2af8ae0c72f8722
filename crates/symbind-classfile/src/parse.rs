//! Binary decoder: raw bytes -> [`ClassFile`].

use crate::error::ClassFileError;
use crate::model::*;
use crate::reader::Cursor;

pub fn parse_class_file(data: &[u8]) -> Result<ClassFile, ClassFileError> {
    let mut cur = Cursor::new(data);

    let magic = cur.u4()?;
    if magic != MAGIC {
        return Err(ClassFileError::BadMagic(magic));
    }
    let minor_version = cur.u2()?;
    let major_version = cur.u2()?;

    let constant_pool_count = cur.u2()?;
    let pool = parse_constant_pool(&mut cur, constant_pool_count)?;

    let access_flags = ClassAccessFlags::from_bits_truncate(cur.u2()?);
    let this_class_index = cur.u2()?;
    let this_class = pool
        .class_name(this_class_index)
        .ok_or(ClassFileError::BadConstantPoolIndex(this_class_index))?
        .to_owned();

    let super_class_index = cur.u2()?;
    let super_class = if super_class_index == 0 {
        None
    } else {
        Some(
            pool.class_name(super_class_index)
                .ok_or(ClassFileError::BadConstantPoolIndex(super_class_index))?
                .to_owned(),
        )
    };

    let interfaces_count = cur.u2()?;
    let mut interfaces = Vec::with_capacity(interfaces_count as usize);
    for _ in 0..interfaces_count {
        let idx = cur.u2()?;
        interfaces.push(
            pool.class_name(idx)
                .ok_or(ClassFileError::BadConstantPoolIndex(idx))?
                .to_owned(),
        );
    }

    let fields_count = cur.u2()?;
    let mut fields = Vec::with_capacity(fields_count as usize);
    for _ in 0..fields_count {
        fields.push(parse_field(&mut cur, &pool)?);
    }

    let methods_count = cur.u2()?;
    let mut methods = Vec::with_capacity(methods_count as usize);
    for _ in 0..methods_count {
        methods.push(parse_method(&mut cur, &pool)?);
    }

    let class_attrs_count = cur.u2()?;
    let mut signature = None;
    let mut deprecated = false;
    let mut runtime_visible_annotations = Vec::new();
    let mut inner_classes = Vec::new();
    for _ in 0..class_attrs_count {
        let (name, payload) = read_raw_attribute(&mut cur, &pool)?;
        match name {
            "Signature" => signature = Some(parse_signature_payload(payload, &pool)?),
            "Deprecated" => deprecated = true,
            "RuntimeVisibleAnnotations" => {
                runtime_visible_annotations = parse_annotations_payload(payload, &pool)?
            }
            "InnerClasses" => inner_classes = parse_inner_classes_payload(payload, &pool)?,
            _ => {}
        }
    }

    Ok(ClassFile {
        minor_version,
        major_version,
        access_flags,
        this_class,
        super_class,
        interfaces,
        fields,
        methods,
        signature,
        deprecated,
        runtime_visible_annotations,
        inner_classes,
    })
}

fn parse_constant_pool(cur: &mut Cursor<'_>, count: u16) -> Result<ConstantPool, ClassFileError> {
    let mut entries = vec![CpInfo::Unusable];
    let mut i = 1u16;
    while i < count {
        let tag = cur.u1()?;
        let entry = match tag {
            1 => {
                let len = cur.u2()? as usize;
                let bytes = cur.bytes(len)?;
                CpInfo::Utf8(decode_modified_utf8(bytes).ok_or(ClassFileError::InvalidUtf8(i))?)
            }
            3 => CpInfo::Integer(cur.i4()?),
            4 => CpInfo::Float(f32::from_bits(cur.u4()?)),
            5 => {
                let v = cur.u8_bytes()? as i64;
                CpInfo::Long(v)
            }
            6 => {
                let bits = cur.u8_bytes()?;
                CpInfo::Double(f64::from_bits(bits))
            }
            7 => CpInfo::Class { name_index: cur.u2()? },
            8 => CpInfo::String { utf8_index: cur.u2()? },
            9 => CpInfo::Fieldref {
                class_index: cur.u2()?,
                name_and_type_index: cur.u2()?,
            },
            10 => CpInfo::Methodref {
                class_index: cur.u2()?,
                name_and_type_index: cur.u2()?,
            },
            11 => CpInfo::InterfaceMethodref {
                class_index: cur.u2()?,
                name_and_type_index: cur.u2()?,
            },
            12 => CpInfo::NameAndType {
                name_index: cur.u2()?,
                descriptor_index: cur.u2()?,
            },
            15 => {
                cur.skip(3)?; // reference_kind (u1) + reference_index (u2)
                CpInfo::Unused
            }
            16 => {
                cur.skip(2)?; // descriptor_index
                CpInfo::Unused
            }
            17 | 18 => {
                cur.skip(4)?; // bootstrap_method_attr_index + name_and_type_index
                CpInfo::Unused
            }
            19 | 20 => {
                cur.skip(2)?; // name_index
                CpInfo::Unused
            }
            _ => return Err(ClassFileError::UnknownConstantTag(tag)),
        };
        let is_wide = matches!(entry, CpInfo::Long(_) | CpInfo::Double(_));
        entries.push(entry);
        i += 1;
        if is_wide {
            entries.push(CpInfo::Unusable);
            i += 1;
        }
    }
    Ok(ConstantPool::new(entries))
}

/// `.class` files store string constants as "modified UTF-8" (JVMS 4.4.7):
/// identical to UTF-8 except the NUL byte is encoded as two bytes and
/// supplementary characters use two three-byte surrogate sequences instead
/// of a four-byte sequence. Ordinary identifiers and literals never hit
/// those cases, so a best-effort standard UTF-8 decode is sufficient here.
fn decode_modified_utf8(bytes: &[u8]) -> Option<String> {
    std::str::from_utf8(bytes).ok().map(|s| s.to_owned())
}

fn read_raw_attribute<'a, 'p>(
    cur: &mut Cursor<'a>,
    pool: &'p ConstantPool,
) -> Result<(&'p str, &'a [u8]), ClassFileError> {
    let name_index = cur.u2()?;
    let name = pool
        .utf8(name_index)
        .ok_or(ClassFileError::BadConstantPoolIndex(name_index))?;
    let len = cur.u4()? as usize;
    let payload = cur.bytes(len)?;
    Ok((name, payload))
}

fn parse_field(cur: &mut Cursor<'_>, pool: &ConstantPool) -> Result<FieldInfo, ClassFileError> {
    let access_flags = FieldAccessFlags::from_bits_truncate(cur.u2()?);
    let name_index = cur.u2()?;
    let name = pool
        .utf8(name_index)
        .ok_or(ClassFileError::BadConstantPoolIndex(name_index))?
        .to_owned();
    let descriptor_index = cur.u2()?;
    let descriptor = pool
        .utf8(descriptor_index)
        .ok_or(ClassFileError::BadConstantPoolIndex(descriptor_index))?
        .to_owned();
    let attributes = parse_member_attributes(cur, pool)?;
    Ok(FieldInfo {
        access_flags,
        name,
        descriptor,
        attributes,
    })
}

fn parse_method(cur: &mut Cursor<'_>, pool: &ConstantPool) -> Result<MethodInfo, ClassFileError> {
    let access_flags = MethodAccessFlags::from_bits_truncate(cur.u2()?);
    let name_index = cur.u2()?;
    let name = pool
        .utf8(name_index)
        .ok_or(ClassFileError::BadConstantPoolIndex(name_index))?
        .to_owned();
    let descriptor_index = cur.u2()?;
    let descriptor = pool
        .utf8(descriptor_index)
        .ok_or(ClassFileError::BadConstantPoolIndex(descriptor_index))?
        .to_owned();
    let attributes = parse_member_attributes(cur, pool)?;
    Ok(MethodInfo {
        access_flags,
        name,
        descriptor,
        attributes,
    })
}

fn parse_member_attributes(
    cur: &mut Cursor<'_>,
    pool: &ConstantPool,
) -> Result<MemberAttributes, ClassFileError> {
    let count = cur.u2()?;
    let mut attrs = MemberAttributes::default();
    for _ in 0..count {
        let (name, payload) = read_raw_attribute(cur, pool)?;
        match name {
            "ConstantValue" => {
                let mut p = Cursor::new(payload);
                let idx = p.u2()?;
                attrs.constant_value = Some(match pool.get(idx) {
                    Some(CpInfo::Integer(v)) => ConstantValue::Int(*v),
                    Some(CpInfo::Long(v)) => ConstantValue::Long(*v),
                    Some(CpInfo::Float(v)) => ConstantValue::Float(*v),
                    Some(CpInfo::Double(v)) => ConstantValue::Double(*v),
                    Some(CpInfo::String { utf8_index }) => ConstantValue::String(
                        pool.utf8(*utf8_index)
                            .ok_or(ClassFileError::BadConstantPoolIndex(*utf8_index))?
                            .to_owned(),
                    ),
                    _ => return Err(ClassFileError::WrongConstantKind(idx, "constant value")),
                });
            }
            "Signature" => attrs.signature = Some(parse_signature_payload(payload, pool)?),
            "Deprecated" => attrs.deprecated = true,
            "RuntimeVisibleAnnotations" => {
                attrs.runtime_visible_annotations = parse_annotations_payload(payload, pool)?
            }
            _ => {}
        }
    }
    Ok(attrs)
}

fn parse_signature_payload(payload: &[u8], pool: &ConstantPool) -> Result<String, ClassFileError> {
    let mut p = Cursor::new(payload);
    let idx = p.u2()?;
    Ok(pool
        .utf8(idx)
        .ok_or(ClassFileError::BadConstantPoolIndex(idx))?
        .to_owned())
}

fn parse_inner_classes_payload(
    payload: &[u8],
    pool: &ConstantPool,
) -> Result<Vec<InnerClassEntry>, ClassFileError> {
    let mut p = Cursor::new(payload);
    let count = p.u2()?;
    let mut out = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let inner_index = p.u2()?;
        let outer_index = p.u2()?;
        let name_index = p.u2()?;
        let access_flags = p.u2()?;
        let inner_class = pool
            .class_name(inner_index)
            .ok_or(ClassFileError::BadConstantPoolIndex(inner_index))?
            .to_owned();
        let outer_class = if outer_index == 0 {
            None
        } else {
            Some(
                pool.class_name(outer_index)
                    .ok_or(ClassFileError::BadConstantPoolIndex(outer_index))?
                    .to_owned(),
            )
        };
        let inner_name = if name_index == 0 {
            None
        } else {
            Some(
                pool.utf8(name_index)
                    .ok_or(ClassFileError::BadConstantPoolIndex(name_index))?
                    .to_owned(),
            )
        };
        out.push(InnerClassEntry {
            inner_class,
            outer_class,
            inner_name,
            access_flags,
        });
    }
    Ok(out)
}

fn parse_annotations_payload(
    payload: &[u8],
    pool: &ConstantPool,
) -> Result<Vec<AnnotationInfo>, ClassFileError> {
    let mut p = Cursor::new(payload);
    let count = p.u2()?;
    let mut out = Vec::with_capacity(count as usize);
    for _ in 0..count {
        out.push(parse_annotation(&mut p, pool)?);
    }
    Ok(out)
}

fn parse_annotation(p: &mut Cursor<'_>, pool: &ConstantPool) -> Result<AnnotationInfo, ClassFileError> {
    let type_index = p.u2()?;
    let type_descriptor = pool
        .utf8(type_index)
        .ok_or(ClassFileError::BadConstantPoolIndex(type_index))?
        .to_owned();
    let pairs_count = p.u2()?;
    let mut elements = Vec::with_capacity(pairs_count as usize);
    for _ in 0..pairs_count {
        let name_index = p.u2()?;
        let name = pool
            .utf8(name_index)
            .ok_or(ClassFileError::BadConstantPoolIndex(name_index))?
            .to_owned();
        let value = parse_element_value(p, pool)?;
        elements.push((name, value));
    }
    Ok(AnnotationInfo { type_descriptor, elements })
}

fn parse_element_value(
    p: &mut Cursor<'_>,
    pool: &ConstantPool,
) -> Result<AnnotationElementValue, ClassFileError> {
    let tag = p.u1()?;
    match tag {
        b'B' | b'C' | b'I' | b'S' | b'Z' => {
            let idx = p.u2()?;
            let v = match pool.get(idx) {
                Some(CpInfo::Integer(v)) => *v,
                _ => return Err(ClassFileError::WrongConstantKind(idx, "int")),
            };
            if tag == b'Z' {
                Ok(AnnotationElementValue::Bool(v != 0))
            } else {
                Ok(AnnotationElementValue::Const(ConstantValue::Int(v)))
            }
        }
        b'D' => {
            let idx = p.u2()?;
            match pool.get(idx) {
                Some(CpInfo::Double(v)) => Ok(AnnotationElementValue::Const(ConstantValue::Double(*v))),
                _ => Err(ClassFileError::WrongConstantKind(idx, "double")),
            }
        }
        b'F' => {
            let idx = p.u2()?;
            match pool.get(idx) {
                Some(CpInfo::Float(v)) => Ok(AnnotationElementValue::Const(ConstantValue::Float(*v))),
                _ => Err(ClassFileError::WrongConstantKind(idx, "float")),
            }
        }
        b'J' => {
            let idx = p.u2()?;
            match pool.get(idx) {
                Some(CpInfo::Long(v)) => Ok(AnnotationElementValue::Const(ConstantValue::Long(*v))),
                _ => Err(ClassFileError::WrongConstantKind(idx, "long")),
            }
        }
        b's' => {
            let idx = p.u2()?;
            let s = pool.utf8(idx).ok_or(ClassFileError::BadConstantPoolIndex(idx))?;
            Ok(AnnotationElementValue::Const(ConstantValue::String(s.to_owned())))
        }
        b'e' => {
            let type_name_index = p.u2()?;
            let const_name_index = p.u2()?;
            let type_descriptor = pool
                .utf8(type_name_index)
                .ok_or(ClassFileError::BadConstantPoolIndex(type_name_index))?
                .to_owned();
            let const_name = pool
                .utf8(const_name_index)
                .ok_or(ClassFileError::BadConstantPoolIndex(const_name_index))?
                .to_owned();
            Ok(AnnotationElementValue::Enum { type_descriptor, const_name })
        }
        b'c' => {
            let idx = p.u2()?;
            let s = pool.utf8(idx).ok_or(ClassFileError::BadConstantPoolIndex(idx))?;
            Ok(AnnotationElementValue::Class(s.to_owned()))
        }
        b'@' => Ok(AnnotationElementValue::Annotation(Box::new(parse_annotation(p, pool)?))),
        b'[' => {
            let count = p.u2()?;
            let mut values = Vec::with_capacity(count as usize);
            for _ in 0..count {
                values.push(parse_element_value(p, pool)?);
            }
            Ok(AnnotationElementValue::Array(values))
        }
        other => Err(ClassFileError::UnknownConstantTag(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_u2(buf: &mut Vec<u8>, v: u16) {
        buf.extend_from_slice(&v.to_be_bytes());
    }
    fn push_u4(buf: &mut Vec<u8>, v: u32) {
        buf.extend_from_slice(&v.to_be_bytes());
    }

    /// Builds the minimal valid class file for `class Empty {}` with no
    /// superclass reference override (still points at `java/lang/Object`).
    fn minimal_class_bytes() -> Vec<u8> {
        let mut buf = Vec::new();
        push_u4(&mut buf, MAGIC);
        push_u2(&mut buf, 0); // minor
        push_u2(&mut buf, 61); // major

        // constant pool: #1 Utf8 "Empty", #2 Class -> #1, #3 Utf8 "java/lang/Object", #4 Class -> #3
        push_u2(&mut buf, 5); // constant_pool_count = count+1
        buf.push(1); // Utf8
        push_u2(&mut buf, 5);
        buf.extend_from_slice(b"Empty");
        buf.push(7); // Class
        push_u2(&mut buf, 1);
        buf.push(1); // Utf8
        push_u2(&mut buf, 16);
        buf.extend_from_slice(b"java/lang/Object");
        buf.push(7); // Class
        push_u2(&mut buf, 3);

        push_u2(&mut buf, 0x0021); // access_flags: PUBLIC | SUPER
        push_u2(&mut buf, 2); // this_class
        push_u2(&mut buf, 4); // super_class
        push_u2(&mut buf, 0); // interfaces_count
        push_u2(&mut buf, 0); // fields_count
        push_u2(&mut buf, 0); // methods_count
        push_u2(&mut buf, 0); // attributes_count
        buf
    }

    #[test]
    fn parses_minimal_class() {
        let bytes = minimal_class_bytes();
        let class = parse_class_file(&bytes).unwrap();
        assert_eq!(class.this_class, "Empty");
        assert_eq!(class.super_class.as_deref(), Some("java/lang/Object"));
        assert!(class.access_flags.contains(ClassAccessFlags::PUBLIC));
        assert!(class.fields.is_empty());
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = minimal_class_bytes();
        bytes[0] = 0;
        assert!(matches!(parse_class_file(&bytes), Err(ClassFileError::BadMagic(_))));
    }
}
