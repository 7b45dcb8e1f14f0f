use tiny_skia::BlendMode;

/// Compositing operator, in canvas `globalCompositeOperation` terms.
///
/// Operators only act where the drawn shape has coverage; pixels outside it
/// are left as they were.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum Operator {
    #[default]
    SourceOver,
    Copy,
    SourceIn,
    DestinationIn,
    DestinationOut,
    Lighter,
    Multiply,
    Screen,
    Xor,
}

impl From<Operator> for BlendMode {
    fn from(op: Operator) -> Self {
        match op {
            Operator::SourceOver => BlendMode::SourceOver,
            Operator::Copy => BlendMode::Source,
            Operator::SourceIn => BlendMode::SourceIn,
            Operator::DestinationIn => BlendMode::DestinationIn,
            Operator::DestinationOut => BlendMode::DestinationOut,
            Operator::Lighter => BlendMode::Plus,
            Operator::Multiply => BlendMode::Multiply,
            Operator::Screen => BlendMode::Screen,
            Operator::Xor => BlendMode::Xor,
        }
    }
}
