#[derive(Debug, Clone, thiserror::Error)]
pub enum ClassFileError {
    #[error("unexpected end of class file")]
    UnexpectedEof,
    #[error("bad magic number, expected 0xCAFEBABE, got {0:#010x}")]
    BadMagic(u32),
    #[error("constant pool index {0} out of range")]
    BadConstantPoolIndex(u16),
    #[error("constant pool entry at index {0} has unexpected kind, expected {1}")]
    WrongConstantKind(u16, &'static str),
    #[error("invalid modified-UTF-8 in constant pool entry {0}")]
    InvalidUtf8(u16),
    #[error("unknown constant pool tag {0}")]
    UnknownConstantTag(u8),
    #[error("failed to read archive directory entry: {0}")]
    Io(String),
}
