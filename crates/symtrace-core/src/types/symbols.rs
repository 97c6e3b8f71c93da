//! Symbol line and resolved-frame types.

use std::fmt;

/// Programming language inferred from a symbol's mangling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolLanguage
{
    /// Rust legacy (`_ZN...17h<hash>E`) or v0 (`_R...`) mangling.
    Rust,
    /// C++ Itanium ABI mangling (`_Z...`).
    Cpp,
    /// Plain C identifier, no mangling.
    C,
}

impl fmt::Display for SymbolLanguage
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let label = match self {
            SymbolLanguage::Rust => "rust",
            SymbolLanguage::Cpp => "c++",
            SymbolLanguage::C => "c",
        };
        write!(f, "{label}")
    }
}

/// Textual descriptor of one frame, as produced by the image loader.
///
/// The i-th line of a resolution result always describes the i-th captured
/// frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSymbolLine
{
    /// Descriptor text, e.g. `./prog(_Z3fooi+0x10) [0x4005a0]`.
    pub text: String,
}

impl RawSymbolLine
{
    /// Wrap a descriptor string.
    pub fn new(text: impl Into<String>) -> Self
    {
        Self { text: text.into() }
    }

    /// Descriptor text.
    pub fn as_str(&self) -> &str
    {
        &self.text
    }
}

impl From<&str> for RawSymbolLine
{
    fn from(text: &str) -> Self
    {
        Self::new(text)
    }
}

impl From<String> for RawSymbolLine
{
    fn from(text: String) -> Self
    {
        Self::new(text)
    }
}

impl fmt::Display for RawSymbolLine
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(&self.text)
    }
}

/// Function name and offset found between the parentheses of a descriptor.
///
/// Both parts always come together: a descriptor either names a symbol with
/// an offset into it, or names no symbol at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolOffset
{
    /// Mangled function name. Empty when the loader only knew a
    /// module-relative offset (position-independent executables).
    pub function: String,
    /// Offset text, e.g. `0x10`.
    pub offset: String,
}

impl SymbolOffset
{
    /// Whether the loader found no symbol name, only a module offset.
    pub fn is_anonymous(&self) -> bool
    {
        self.function.is_empty()
    }
}

/// Structured form of a [`RawSymbolLine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSymbol
{
    /// Path of the binary module containing the address.
    pub module: String,
    /// Function and offset, absent for module-only frames.
    pub symbol: Option<SymbolOffset>,
    /// Address text between the brackets.
    pub address: String,
}

impl ParsedSymbol
{
    /// Mangled function name, if the descriptor had one.
    pub fn function(&self) -> Option<&str>
    {
        self.symbol.as_ref().map(|s| s.function.as_str())
    }

    /// Offset into the function, if the descriptor had one.
    pub fn offset(&self) -> Option<&str>
    {
        self.symbol.as_ref().map(|s| s.offset.as_str())
    }

    /// The `<address> (<module>)` text used when no source line is known.
    pub fn fallback_location(&self) -> String
    {
        format!("{} ({})", self.address, self.module)
    }
}

/// Reassembles the descriptor shape the symbol was parsed from.
impl fmt::Display for ParsedSymbol
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match &self.symbol {
            Some(sym) => write!(f, "{}({}+{}) [{}]", self.module, sym.function, sym.offset, self.address),
            None => write!(f, "{} [{}]", self.module, self.address),
        }
    }
}

/// Final per-frame record handed to the report formatter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFrame
{
    /// 1-based position in the report.
    pub index: usize,
    /// Demangled name, `function+offset`, or `?`.
    pub display_name: String,
    /// `file:line`, or `<address> (<module>)`.
    pub location: String,
}
