//! Language resolution and cosmetic translation of recurring titles.
//!
//! Text content is always generated in the base language. Other languages only
//! swap known title/description templates; everything else gets a
//! "(<display name>)" suffix so the listener can tell which audio track applies.

use serde::Serialize;

use crate::podcast::PodcastError;

/// Content language every episode is generated in first.
pub const BASE_CONTENT_LANGUAGE: &str = "English";
pub const BASE_LANGUAGE_CODE: &str = "en";

/// Series name used for synthesized podcast titles.
pub const SERIES_TITLE: &str = "Daily Regulatory Briefing";
pub const SERIES_DESCRIPTION: &str =
    "AI-generated daily summaries of Indian financial regulatory updates";
/// Episode title used when the oracle output carries none.
pub const FALLBACK_EPISODE_TITLE: &str = "Regulatory Update";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageInfo {
    pub code: &'static str,
    /// Canonical tag stored on episodes, e.g. "Spanish".
    pub content_language: &'static str,
    /// Native name shown to listeners, e.g. "Español".
    pub display_name: &'static str,
    pub locale: &'static str,
}

impl LanguageInfo {
    pub fn is_base(&self) -> bool {
        self.code == BASE_LANGUAGE_CODE
    }
}

static LANGUAGES: &[LanguageInfo] = &[
    LanguageInfo { code: "en", content_language: "English", display_name: "English", locale: "en-US" },
    LanguageInfo { code: "es", content_language: "Spanish", display_name: "Español", locale: "es-ES" },
    LanguageInfo { code: "fr", content_language: "French", display_name: "Français", locale: "fr-FR" },
    LanguageInfo { code: "de", content_language: "German", display_name: "Deutsch", locale: "de-DE" },
    LanguageInfo { code: "hi", content_language: "Hindi", display_name: "हिन्दी", locale: "hi-IN" },
    LanguageInfo { code: "pt", content_language: "Portuguese", display_name: "Português", locale: "pt-BR" },
    LanguageInfo { code: "ja", content_language: "Japanese", display_name: "日本語", locale: "ja-JP" },
    LanguageInfo { code: "zh", content_language: "Chinese", display_name: "中文", locale: "zh-CN" },
];

pub fn supported_languages() -> &'static [LanguageInfo] {
    LANGUAGES
}

pub fn base_language() -> &'static LanguageInfo {
    &LANGUAGES[0]
}

/// Resolves a requested language code. Absent or blank means the base language.
/// Region suffixes are ignored: `es-MX` and `es_mx` both resolve to `es`.
pub fn resolve(code: Option<&str>) -> Result<&'static LanguageInfo, PodcastError> {
    let raw = match code.map(str::trim) {
        None | Some("") => return Ok(base_language()),
        Some(raw) => raw,
    };
    let primary = raw
        .split(['-', '_'])
        .next()
        .unwrap_or(raw)
        .to_ascii_lowercase();

    LANGUAGES
        .iter()
        .find(|l| l.code == primary)
        .ok_or_else(|| PodcastError::UnsupportedLanguage(raw.to_string()))
}

/// Canned translations of recurring English strings, per language code.
fn templates(code: &str) -> &'static [(&'static str, &'static str)] {
    match code {
        "es" => &[
            (SERIES_TITLE, "Informe Regulatorio Diario"),
            (SERIES_DESCRIPTION, "Resúmenes diarios generados por IA de las novedades regulatorias financieras de la India"),
            (FALLBACK_EPISODE_TITLE, "Actualización Regulatoria"),
        ],
        "fr" => &[
            (SERIES_TITLE, "Briefing Réglementaire Quotidien"),
            (SERIES_DESCRIPTION, "Résumés quotidiens générés par IA des actualités réglementaires financières indiennes"),
            (FALLBACK_EPISODE_TITLE, "Mise à jour réglementaire"),
        ],
        "de" => &[
            (SERIES_TITLE, "Täglicher Regulierungsbericht"),
            (SERIES_DESCRIPTION, "KI-generierte tägliche Zusammenfassungen indischer Finanzregulierungs-Updates"),
            (FALLBACK_EPISODE_TITLE, "Regulatorisches Update"),
        ],
        "hi" => &[
            (SERIES_TITLE, "दैनिक नियामक ब्रीफिंग"),
            (SERIES_DESCRIPTION, "भारतीय वित्तीय नियामक अपडेट का एआई-जनित दैनिक सारांश"),
            (FALLBACK_EPISODE_TITLE, "नियामक अपडेट"),
        ],
        "pt" => &[
            (SERIES_TITLE, "Boletim Regulatório Diário"),
            (SERIES_DESCRIPTION, "Resumos diários gerados por IA das atualizações regulatórias financeiras da Índia"),
            (FALLBACK_EPISODE_TITLE, "Atualização Regulatória"),
        ],
        "ja" => &[
            (SERIES_TITLE, "デイリー規制ブリーフィング"),
            (SERIES_DESCRIPTION, "インドの金融規制に関する最新情報をAIが毎日要約"),
            (FALLBACK_EPISODE_TITLE, "規制アップデート"),
        ],
        "zh" => &[
            (SERIES_TITLE, "每日监管简报"),
            (SERIES_DESCRIPTION, "由AI生成的印度金融监管动态每日摘要"),
            (FALLBACK_EPISODE_TITLE, "监管动态"),
        ],
        _ => &[],
    }
}

/// Translates a title or description for display.
///
/// A template matches either the whole string or a prefix followed by a space,
/// in which case the remainder (usually " - <date>") is kept as is.
pub fn translate_text(text: &str, language: &LanguageInfo) -> String {
    if language.is_base() {
        return text.to_string();
    }

    for (english, translated) in templates(language.code) {
        if text == *english {
            return (*translated).to_string();
        }
        if let Some(rest) = text.strip_prefix(english) {
            if rest.starts_with(' ') {
                return format!("{translated}{rest}");
            }
        }
    }

    format!("{text} ({})", language.display_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_supported_language_resolves() {
        for lang in supported_languages() {
            let resolved = resolve(Some(lang.code)).unwrap();
            assert_eq!(resolved, lang);
            assert!(!resolved.display_name.is_empty());
            assert!(!resolved.content_language.is_empty());
        }
    }

    #[test]
    fn test_resolution_is_deterministic() {
        assert_eq!(resolve(Some("es")).unwrap().content_language, "Spanish");
        assert_eq!(resolve(Some("es")).unwrap().content_language, "Spanish");
        assert_eq!(resolve(Some("ES-mx")).unwrap().code, "es");
        assert_eq!(resolve(Some("pt_BR")).unwrap().code, "pt");
    }

    #[test]
    fn test_missing_code_means_base_language() {
        assert!(resolve(None).unwrap().is_base());
        assert!(resolve(Some("  ")).unwrap().is_base());
        assert_eq!(base_language().content_language, BASE_CONTENT_LANGUAGE);
    }

    #[test]
    fn test_unsupported_language_fails() {
        let err = resolve(Some("klingon")).unwrap_err();
        assert!(matches!(err, PodcastError::UnsupportedLanguage(code) if code == "klingon"));
        assert!(resolve(Some("xx")).is_err());
    }

    #[test]
    fn test_base_language_translation_is_identity() {
        let en = base_language();
        assert_eq!(translate_text("Anything at all", en), "Anything at all");
    }

    #[test]
    fn test_template_translation_keeps_date_suffix() {
        let es = resolve(Some("es")).unwrap();
        assert_eq!(
            translate_text("Daily Regulatory Briefing - Jan 1, 2025", es),
            "Informe Regulatorio Diario - Jan 1, 2025"
        );
        assert_eq!(translate_text(SERIES_TITLE, es), "Informe Regulatorio Diario");
    }

    #[test]
    fn test_unknown_text_gets_display_name_suffix() {
        let de = resolve(Some("de")).unwrap();
        assert_eq!(
            translate_text("SEBI tightens F&O rules", de),
            "SEBI tightens F&O rules (Deutsch)"
        );
        // A template word glued to other text is not a template match.
        assert_eq!(
            translate_text("Regulatory Updates galore", de),
            "Regulatory Updates galore (Deutsch)"
        );
    }
}
