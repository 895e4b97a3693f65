//! Wire format exchanged with the recognition worker.

use serde::{Deserialize, Serialize};

use crate::canvas::SymbolMap;
use crate::constants::SYMBOL_TYPE_TAG;
use crate::text_metrics::GlyphMeasurer;
use crate::types::SymbolId;

/// One symbol as the recognizer sees it: a bounding box and a token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionSymbol {
    pub id: SymbolId,
    #[serde(rename = "type")]
    pub kind: String,
    pub top: f32,
    pub left: f32,
    pub width: f32,
    pub height: f32,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionRequest {
    pub symbols: Vec<RecognitionSymbol>,
}

impl RecognitionRequest {
    /// Serialize a snapshot of the canvas, in creation order.
    pub fn from_symbols(symbols: &SymbolMap, measurer: &dyn GlyphMeasurer) -> Self {
        let symbols = symbols
            .iter()
            .map(|(id, s)| {
                let bounds = s.bounds(measurer);
                RecognitionSymbol {
                    id: *id,
                    kind: SYMBOL_TYPE_TAG.to_string(),
                    top: bounds.top,
                    left: bounds.left,
                    width: bounds.width,
                    height: bounds.height,
                    token: s.spec().recognition_token().to_string(),
                }
            })
            .collect();
        Self { symbols }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResponse {
    pub mathml: String,
    #[serde(rename = "unusedSymbols", default)]
    pub unused_symbols: Vec<SymbolId>,
}
