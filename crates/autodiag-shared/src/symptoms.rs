//! Offline symptom table.
//!
//! Used only when the remote assistant cannot be reached. Entries are
//! checked in order and the first entry with a keyword contained in the
//! folded symptom wins.

use crate::part_images::fold_text;
use crate::visual_context::VisualContext;
use crate::zones::{CarView, HighlightZone, LegacyCategory};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Baixa,
    Media,
    Alta,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Baixa => "baixa",
            Severity::Media => "média",
            Severity::Alta => "alta",
        };
        f.write_str(label)
    }
}

/// A canned diagnosis for a common symptom family
#[derive(Debug, Clone, Serialize)]
pub struct OfflineDiagnosis {
    pub id: &'static str,
    pub title: &'static str,
    pub category: LegacyCategory,
    pub zone: HighlightZone,
    pub view: CarView,
    pub part_name: &'static str,
    pub severity: Severity,
    pub summary: &'static str,
    pub probable_causes: &'static [&'static str],
    pub recommendation: &'static str,
    /// Folded (lowercase, no diacritics) substrings that select this entry
    #[serde(skip)]
    pub keywords: &'static [&'static str],
}

impl OfflineDiagnosis {
    pub fn to_visual_context(&self) -> VisualContext {
        VisualContext::new(self.part_name, self.view, Some(self.zone))
    }
}

static TABLE: &[OfflineDiagnosis] = &[
    OfflineDiagnosis {
        id: "freios_desgaste",
        title: "Desgaste das pastilhas de freio",
        category: LegacyCategory::Freios,
        zone: HighlightZone::BrakeFront,
        view: CarView::Inferior,
        part_name: "Pastilha de freio",
        severity: Severity::Alta,
        summary: "Ruído agudo ao frear indica pastilhas no limite de desgaste ou disco marcado.",
        probable_causes: &[
            "Pastilhas de freio gastas",
            "Disco de freio com sulcos",
            "Falta de lubrificação nos pinos do cáliper",
        ],
        recommendation: "Inspecione pastilhas e discos imediatamente; evite frenagens bruscas até a troca.",
        keywords: &["freio", "chiando", "pastilha", "frear", "frenagem"],
    },
    OfflineDiagnosis {
        id: "motor_superaquecimento",
        title: "Superaquecimento do motor",
        category: LegacyCategory::Motor,
        zone: HighlightZone::Radiator,
        view: CarView::Motor,
        part_name: "Radiador",
        severity: Severity::Alta,
        summary: "Temperatura acima do normal aponta falha no sistema de arrefecimento.",
        probable_causes: &[
            "Nível baixo de líquido de arrefecimento",
            "Radiador obstruído",
            "Válvula termostática travada",
            "Bomba d'água com defeito",
        ],
        recommendation: "Pare o veículo, aguarde esfriar e verifique o nível do líquido de arrefecimento.",
        keywords: &["superaquec", "temperatura", "fervendo", "motor"],
    },
    OfflineDiagnosis {
        id: "suspensao_ruido",
        title: "Ruído na suspensão",
        category: LegacyCategory::SuspensaoDianteira,
        zone: HighlightZone::SuspensionFront,
        view: CarView::Inferior,
        part_name: "Amortecedor",
        severity: Severity::Media,
        summary: "Batidas em pisos irregulares sugerem folga em componentes da suspensão.",
        probable_causes: &[
            "Amortecedor com vazamento",
            "Bieleta com folga",
            "Buchas da bandeja ressecadas",
        ],
        recommendation: "Agende uma inspeção da suspensão dianteira e verifique buchas e bieletas.",
        keywords: &["suspens", "amortecedor", "batendo", "buraco", "barulho"],
    },
    OfflineDiagnosis {
        id: "escapamento_fumaca",
        title: "Fumaça no escapamento",
        category: LegacyCategory::Escapamento,
        zone: HighlightZone::Exhaust,
        view: CarView::Inferior,
        part_name: "Escapamento",
        severity: Severity::Media,
        summary: "A cor da fumaça indica a origem: azul (óleo), branca (arrefecimento) ou preta (mistura rica).",
        probable_causes: &[
            "Queima de óleo por anéis desgastados",
            "Junta do cabeçote danificada",
            "Catalisador obstruído",
        ],
        recommendation: "Observe a cor da fumaça e leve o veículo para análise de emissões.",
        keywords: &["escapamento", "fumaca", "escape", "catalisador"],
    },
];

/// Look up a canned diagnosis for a symptom description
pub fn analyze_symptom(symptom: &str) -> Option<&'static OfflineDiagnosis> {
    let folded = fold_text(symptom);
    if folded.trim().is_empty() {
        return None;
    }

    TABLE
        .iter()
        .find(|entry| entry.keywords.iter().any(|k| folded.contains(k)))
}

/// All canned diagnoses, in lookup order
pub fn all_offline_diagnoses() -> &'static [OfflineDiagnosis] {
    TABLE
}
