//! 組み込みサンプルライブラリ
//!
//! ファイルをアップロードせずにパイプラインを試すための短いテキスト

use crate::types::DocumentType;

/// サンプルテキスト
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub id: u32,
    pub title: &'static str,
    pub doc_type: DocumentType,
    pub content: &'static str,
}

pub const SAMPLE_LIBRARY: [Sample; 4] = [
    Sample {
        id: 101,
        title: "The Art of War (Sun Tzu)",
        doc_type: DocumentType::NonFiction,
        content: "Sun Tzu said: The art of war is of vital importance to the State. It is a matter of life and death, a road either to safety or to ruin. Hence it is a subject of inquiry which can on no account be neglected...",
    },
    Sample {
        id: 102,
        title: "A Study in Scarlet (Excerpt)",
        doc_type: DocumentType::Fiction,
        content: "In the year 1878 I took my degree of Doctor of Medicine of the University of London...",
    },
    Sample {
        id: 103,
        title: "Animal Farm (Orwell Summary)",
        doc_type: DocumentType::Fiction,
        content: "Old Major, the old boar on the Manor Farm calls the animals for a meeting...",
    },
    Sample {
        id: 104,
        title: "Poor Folk / The Overcoat (Dostoevsky)",
        doc_type: DocumentType::Fiction,
        content: "Makar Devushkin, a poor and aging government clerk, is living a life similar to the main character in Gogol's 'The Overcoat'...",
    },
];

pub fn find_sample(id: u32) -> Option<&'static Sample> {
    SAMPLE_LIBRARY.iter().find(|s| s.id == id)
}
