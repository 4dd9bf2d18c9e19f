//! Part image registry.
//!
//! Keys are normalized part names (lowercase ASCII, underscores). Lookup
//! tries an exact key first, then the first key in table order that
//! contains or is contained by the normalized name.

use serde::Serialize;

/// Image shown on the part card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PartImage {
    pub url: &'static str,
    pub alt: &'static str,
    pub category: &'static str,
}

struct Entry {
    key: &'static str,
    image: PartImage,
}

const fn entry(
    key: &'static str,
    url: &'static str,
    alt: &'static str,
    category: &'static str,
) -> Entry {
    Entry {
        key,
        image: PartImage { url, alt, category },
    }
}

/// Used when nothing in the registry matches
pub const FALLBACK_PART_IMAGE: PartImage = PartImage {
    url: "https://images.unsplash.com/photo-1486262715619-67b85e0b08d3?q=80&w=800&auto=format&fit=crop",
    alt: "Peça automotiva genérica",
    category: "Geral",
};

const IMG_BATTERY: &str = "https://images.unsplash.com/photo-1624525572672-132313334974?q=80&w=800&auto=format&fit=crop";
const IMG_ENGINE_BAY: &str = "https://images.unsplash.com/photo-1486262715619-67b85e0b08d3?q=80&w=800&auto=format&fit=crop";
const IMG_ENGINE: &str = "https://images.unsplash.com/photo-1580274455191-1c62238fa333?q=80&w=800&auto=format&fit=crop";
const IMG_SPARK_PLUG: &str = "https://images.unsplash.com/photo-1635786157887-173302149035?q=80&w=800&auto=format&fit=crop";
const IMG_WATER_PUMP: &str = "https://images.unsplash.com/photo-1615906655593-ad0386982a0f?q=80&w=800&auto=format&fit=crop";
const IMG_BELT: &str = "https://images.unsplash.com/photo-1619642751034-765dfdf7c58e?q=80&w=800&auto=format&fit=crop";
const IMG_FILTER: &str = "https://images.unsplash.com/photo-1558618666-fcd25c85cd64?q=80&w=800&auto=format&fit=crop";
const IMG_FLUID: &str = "https://images.unsplash.com/photo-1607860108855-64acf2078ed9?q=80&w=800&auto=format&fit=crop";
const IMG_OIL: &str = "https://images.unsplash.com/photo-1635784623083-0db6c7e3f927?q=80&w=800&auto=format&fit=crop";
const IMG_TIRE: &str = "https://images.unsplash.com/photo-1580441527853-c5701650a075?q=80&w=800&auto=format&fit=crop";
const IMG_BRAKE_PAD: &str = "https://images.unsplash.com/photo-1617469767053-d3b523a0b982?q=80&w=800&auto=format&fit=crop";
const IMG_BRAKE_DISC: &str = "https://images.unsplash.com/photo-1612825173281-9a193378527e?q=80&w=800&auto=format&fit=crop";
const IMG_SHOCK: &str = "https://images.unsplash.com/photo-1503376780353-7e6692767b70?q=80&w=800&auto=format&fit=crop";
const IMG_SPRING: &str = "https://images.unsplash.com/photo-1489824904134-891ab64532f1?q=80&w=800&auto=format&fit=crop";
const IMG_BUSHING: &str = "https://images.unsplash.com/photo-1544636331-e26879cd4d9b?q=80&w=800&auto=format&fit=crop";
const IMG_STEERING: &str = "https://images.unsplash.com/photo-1492144534655-ae79c964c9d7?q=80&w=800&auto=format&fit=crop";
const IMG_WHEEL: &str = "https://images.unsplash.com/photo-1571607388263-1044f9ea01dd?q=80&w=800&auto=format&fit=crop";
const IMG_HEADLIGHT: &str = "https://images.unsplash.com/photo-1494976388531-d1058494cdd8?q=80&w=800&auto=format&fit=crop";
const IMG_TAILLIGHT: &str = "https://images.unsplash.com/photo-1552519507-da3b142c6e3d?q=80&w=800&auto=format&fit=crop";

static REGISTRY: &[Entry] = &[
    // Sistema elétrico
    entry("bateria", IMG_BATTERY, "Bateria automotiva", "Elétrica"),
    entry("alternador", IMG_ENGINE_BAY, "Alternador do veículo", "Elétrica"),
    entry("motor_de_partida", IMG_ENGINE, "Motor de partida", "Elétrica"),
    entry("velas", IMG_SPARK_PLUG, "Velas de ignição", "Ignição"),
    entry("vela_ignicao", IMG_SPARK_PLUG, "Vela de ignição", "Ignição"),
    entry("vela_de_ignicao", IMG_SPARK_PLUG, "Vela de ignição", "Ignição"),
    // Motor e arrefecimento
    entry("radiador", IMG_ENGINE_BAY, "Radiador automotivo", "Arrefecimento"),
    entry("bomba_dagua", IMG_WATER_PUMP, "Bomba d'água do motor", "Arrefecimento"),
    entry("bomba_de_agua", IMG_WATER_PUMP, "Bomba d'água do motor", "Arrefecimento"),
    entry("correia_dentada", IMG_BELT, "Correia dentada", "Motor"),
    entry("correia", IMG_BELT, "Correia do motor", "Motor"),
    entry("motor", IMG_ENGINE, "Motor do veículo", "Motor"),
    entry("filtro_ar", IMG_FILTER, "Filtro de ar do motor", "Admissão"),
    entry("filtro_de_ar", IMG_FILTER, "Filtro de ar do motor", "Admissão"),
    entry("liquido_arrefecimento", IMG_FLUID, "Líquido de arrefecimento", "Arrefecimento"),
    entry("oleo_motor", IMG_OIL, "Óleo do motor", "Lubrificação"),
    entry("oleo_do_motor", IMG_OIL, "Óleo do motor", "Lubrificação"),
    // Suspensão e freios
    entry("pneu", IMG_TIRE, "Pneu automotivo", "Rodas"),
    entry("pneus", IMG_TIRE, "Pneus automotivos", "Rodas"),
    entry("pastilha_freio", IMG_BRAKE_PAD, "Pastilha de freio", "Freios"),
    entry("pastilha_de_freio", IMG_BRAKE_PAD, "Pastilha de freio", "Freios"),
    entry("pastilhas_de_freio", IMG_BRAKE_PAD, "Pastilhas de freio", "Freios"),
    entry("disco_freio", IMG_BRAKE_DISC, "Disco de freio ventilado", "Freios"),
    entry("disco_de_freio", IMG_BRAKE_DISC, "Disco de freio ventilado", "Freios"),
    entry("discos_de_freio", IMG_BRAKE_DISC, "Discos de freio", "Freios"),
    entry("amortecedor", IMG_SHOCK, "Amortecedor automotivo", "Suspensão"),
    entry("amortecedores", IMG_SHOCK, "Amortecedores", "Suspensão"),
    entry("mola", IMG_SPRING, "Mola de suspensão", "Suspensão"),
    entry("mola_suspensao", IMG_SPRING, "Mola de suspensão", "Suspensão"),
    entry("fluido_freio", IMG_FLUID, "Fluido de freio", "Freios"),
    entry("fluido_de_freio", IMG_FLUID, "Fluido de freio", "Freios"),
    entry("caliper", IMG_BRAKE_DISC, "Cáliper de freio", "Freios"),
    entry("bieleta", IMG_SPRING, "Bieleta da barra estabilizadora", "Suspensão"),
    entry("bucha_suspensao", IMG_BUSHING, "Bucha de suspensão", "Suspensão"),
    entry("terminal_direcao", IMG_STEERING, "Terminal de direção", "Direção"),
    // Rodas
    entry("roda", IMG_WHEEL, "Roda de liga leve", "Rodas"),
    entry("rodas", IMG_WHEEL, "Rodas de liga leve", "Rodas"),
    // Escapamento
    entry("escapamento", IMG_FILTER, "Sistema de escapamento", "Escapamento"),
    entry("catalisador", IMG_STEERING, "Catalisador automotivo", "Escapamento"),
    entry("silenciador", IMG_BELT, "Silenciador de escape", "Escapamento"),
    entry("sensor_oxigenio", IMG_ENGINE_BAY, "Sensor de oxigênio (sonda lambda)", "Escapamento"),
    entry("sonda_lambda", IMG_ENGINE_BAY, "Sonda lambda", "Escapamento"),
    // Transmissão
    entry("embreagem", IMG_ENGINE, "Kit de embreagem", "Transmissão"),
    entry("cambio", IMG_FILTER, "Câmbio manual/automático", "Transmissão"),
    // Iluminação
    entry("farol", IMG_HEADLIGHT, "Farol dianteiro", "Iluminação"),
    entry("farois", IMG_HEADLIGHT, "Faróis dianteiros", "Iluminação"),
    entry("lanterna", IMG_TAILLIGHT, "Lanterna traseira", "Iluminação"),
    entry("lanternas", IMG_TAILLIGHT, "Lanternas traseiras", "Iluminação"),
];

/// Map a precomposed lowercase Latin letter to its base letter
fn fold_diacritic(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => 'c',
        'ď' => 'd',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => 'e',
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => 'g',
        'ĥ' => 'h',
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' => 'i',
        'ĵ' => 'j',
        'ķ' => 'k',
        'ĺ' | 'ļ' | 'ľ' => 'l',
        'ñ' | 'ń' | 'ņ' | 'ň' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ō' | 'ŏ' | 'ő' => 'o',
        'ŕ' | 'ŗ' | 'ř' => 'r',
        'ś' | 'ŝ' | 'ş' | 'š' => 's',
        'ţ' | 'ť' => 't',
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => 'u',
        'ŵ' => 'w',
        'ý' | 'ÿ' | 'ŷ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        other => other,
    }
}

/// Combining diacritical marks, left behind by already-decomposed input
fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036F}').contains(&c)
}

/// Lowercase and strip diacritics, keeping everything else
pub fn fold_text(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| !is_combining_mark(*c))
        .map(fold_diacritic)
        .collect()
}

/// Normalize a part name into registry-key form
pub fn normalize_part_name(name: &str) -> String {
    let folded = fold_text(name);
    let underscored = folded.split_whitespace().collect::<Vec<_>>().join("_");
    underscored
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
        .collect()
}

fn lookup(part_name: Option<&str>) -> Option<&'static PartImage> {
    let normalized = normalize_part_name(part_name?);
    if normalized.is_empty() {
        return None;
    }

    if let Some(entry) = REGISTRY.iter().find(|e| e.key == normalized) {
        return Some(&entry.image);
    }

    REGISTRY
        .iter()
        .find(|e| normalized.contains(e.key) || e.key.contains(normalized.as_str()))
        .map(|e| &e.image)
}

/// Full image info for a part, falling back to the generic image
pub fn part_image(part_name: Option<&str>) -> PartImage {
    lookup(part_name).copied().unwrap_or(FALLBACK_PART_IMAGE)
}

/// Image URL for a part, falling back to the generic image
pub fn part_image_url(part_name: Option<&str>) -> &'static str {
    part_image(part_name).url
}

/// Whether the registry has a dedicated image for this part
pub fn has_part_image(part_name: Option<&str>) -> bool {
    lookup(part_name).is_some()
}
