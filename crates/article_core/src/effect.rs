/// Work the assembler must perform next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    ExtractContent,
    RenderMarkdown,
    ResolveImages,
    WriteDocument,
}
