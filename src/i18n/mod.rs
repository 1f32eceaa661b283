//! Internationalization (i18n) module.
//!
//! Provides localized strings for library fallbacks and CLI output.
//! English is the default language; Spanish is available as an alternative.
//! Recurrence descriptions take a [`Lang`] explicitly; everything else reads
//! the process-wide language set once at startup.

use std::sync::OnceLock;

static CURRENT_LANG: OnceLock<Lang> = OnceLock::new();

/// Supported languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lang {
    /// English (default)
    En,
    /// Spanish
    Es,
}

impl Lang {
    /// Parse a language code string (e.g. "en", "es", "en_US", "es_ES").
    /// Returns `None` for unrecognized codes.
    pub fn from_code(code: &str) -> Option<Self> {
        let normalized = code.to_lowercase();
        let prefix = normalized.split(['_', '-', '.']).next().unwrap_or("");
        match prefix {
            "en" => Some(Self::En),
            "es" => Some(Self::Es),
            _ => None,
        }
    }

    /// Return the ISO 639-1 code for this language.
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
        }
    }
}

/// Initialize the global language. Call once at startup.
/// If already initialized, this is a no-op.
pub fn set_lang(lang: Lang) {
    let _ = CURRENT_LANG.set(lang);
}

/// Get the currently configured language (defaults to English).
pub fn lang() -> Lang {
    CURRENT_LANG.get().copied().unwrap_or(Lang::En)
}

/// Detect language from `TRIDESK_LANG`, then `LC_MESSAGES`, then `LANG`.
pub fn detect_system_lang() -> Lang {
    ["TRIDESK_LANG", "LC_MESSAGES", "LANG"]
        .iter()
        .find_map(|var| std::env::var(var).ok().and_then(|v| Lang::from_code(&v)))
        .unwrap_or(Lang::En)
}

/// Macro for defining translatable message functions.
///
/// The three-argument form returns the string for the current language.
/// The four-argument form also defines an `_in` variant taking a [`Lang`].
macro_rules! msg {
    ($name:ident, $en:expr, $es:expr) => {
        /// Returns a localized string for the current language.
        pub fn $name() -> &'static str {
            match lang() {
                Lang::En => $en,
                Lang::Es => $es,
            }
        }
    };
    ($name:ident, $name_in:ident, $en:expr, $es:expr) => {
        /// Returns a localized string for the given language.
        pub fn $name_in(lang: Lang) -> &'static str {
            match lang {
                Lang::En => $en,
                Lang::Es => $es,
            }
        }

        /// Returns a localized string for the current language.
        pub fn $name() -> &'static str {
            $name_in(lang())
        }
    };
}

// ── General ──────────────────────────────────────────────────────

msg!(
    app_about,
    "tridesk: normalize mail payloads and work with recurrence rules",
    "tridesk: normaliza mensajes de correo y trabaja con reglas de recurrencia"
);
msg!(
    app_long_about,
    "tridesk: normalize mail API payloads into display-ready messages\n(decoded body, attachments, embedded inline images) and parse,\nbuild and describe RFC 5545 recurrence rules.",
    "tridesk: normaliza mensajes de la API de correo en mensajes listos\npara mostrar (cuerpo decodificado, adjuntos, im\u{e1}genes en l\u{ed}nea)\ny analiza, construye y describe reglas de recurrencia RFC 5545."
);

// ── Library fallbacks ────────────────────────────────────────────

msg!(
    fallback_subject,
    fallback_subject_in,
    "(No Subject)",
    "(Sin asunto)"
);
msg!(
    fallback_sender,
    fallback_sender_in,
    "(Unknown Sender)",
    "(Remitente desconocido)"
);
msg!(
    does_not_repeat,
    does_not_repeat_in,
    "Does not repeat",
    "No se repite"
);

// ── CLI help strings ─────────────────────────────────────────────

msg!(
    help_verbose,
    "Verbose logging (-v info, -vv debug, -vvv trace)",
    "Registro detallado (-v info, -vv debug, -vvv trace)"
);
msg!(
    help_lang,
    "Language (en, es). Defaults to system locale",
    "Idioma (en, es). Por defecto usa el idioma del sistema"
);
msg!(
    help_cmd_normalize,
    "Normalize raw messages from a JSON file",
    "Normalizar mensajes en bruto desde un fichero JSON"
);
msg!(
    help_cmd_attachment,
    "Save one attachment from an attachment store",
    "Guardar un adjunto desde un almac\u{e9}n de adjuntos"
);
msg!(
    help_cmd_rrule,
    "Parse, describe and convert recurrence rules",
    "Analizar, describir y convertir reglas de recurrencia"
);
msg!(
    help_cmd_rrule_describe,
    "Describe a rule in words",
    "Describir una regla con palabras"
);
msg!(
    help_cmd_rrule_parse,
    "Show the structured rule and its canonical form",
    "Mostrar la regla estructurada y su forma can\u{f3}nica"
);
msg!(
    help_cmd_rrule_to_ui,
    "Convert a rule to form state (JSON)",
    "Convertir una regla a estado de formulario (JSON)"
);
msg!(
    help_cmd_rrule_from_ui,
    "Convert form state (JSON file or '-') to a rule",
    "Convertir estado de formulario (fichero JSON o '-') a regla"
);
msg!(
    help_cmd_completions,
    "Generate shell completions",
    "Generar completions para tu shell"
);
msg!(
    help_cmd_manpage,
    "Generate a man page",
    "Generar p\u{e1}gina de manual"
);
msg!(help_output_json, "Output as JSON", "Salida en formato JSON");

// ── CLI output ───────────────────────────────────────────────────

msg!(msg_subject, "Subject", "Asunto");
msg!(msg_from, "From", "De");
msg!(msg_to, "To", "Para");
msg!(msg_date, "Date", "Fecha");
msg!(msg_labels, "Labels", "Etiquetas");
msg!(msg_attachments, "Attachments", "Adjuntos");
msg!(msg_inline_images, "Inline images", "Im\u{e1}genes en l\u{ed}nea");
msg!(msg_body_length, "Body length", "Longitud del cuerpo");
msg!(msg_messages, "message(s)", "mensaje(s)");
msg!(
    msg_dropped_malformed,
    "malformed message(s) skipped",
    "mensaje(s) mal formado(s) omitido(s)"
);
msg!(msg_saved_to, "Saved to", "Guardado en");
msg!(msg_short_label, "Short", "Corta");
msg!(msg_full_description, "Full", "Completa");

// ── Errors ───────────────────────────────────────────────────────

msg!(
    err_file_not_found,
    "File not found",
    "Fichero no encontrado"
);
msg!(
    err_not_a_rule,
    "Not a recurrence rule",
    "No es una regla de recurrencia"
);
