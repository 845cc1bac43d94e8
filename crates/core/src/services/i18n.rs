//! Static translation tables for the public site.

use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Supported site languages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    Es,
    En,
}

impl Lang {
    /// Two-letter code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Es => "es",
            Self::En => "en",
        }
    }

    /// Parse a language code such as `en` or `en-GB`. Unknown codes give `None`.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        let primary = code.trim().split(['-', '_']).next()?.to_ascii_lowercase();
        match primary.as_str() {
            "es" => Some(Self::Es),
            "en" => Some(Self::En),
            _ => None,
        }
    }

    /// Pick the preferred supported language from an `Accept-Language` value.
    #[must_use]
    pub fn from_accept_language(header: &str) -> Option<Self> {
        let mut ranked: Vec<(f32, Self)> = header
            .split(',')
            .filter_map(|part| {
                let mut pieces = part.split(';');
                let lang = Self::from_code(pieces.next()?)?;
                let quality = pieces
                    .find_map(|p| p.trim().strip_prefix("q="))
                    .and_then(|q| q.parse::<f32>().ok())
                    .unwrap_or(1.0);
                Some((quality, lang))
            })
            .collect();
        ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
        ranked.first().map(|(_, lang)| *lang)
    }

    /// Full translation table for this language.
    #[must_use]
    pub fn table(self) -> &'static Value {
        match self {
            Self::Es => &ES,
            Self::En => &EN,
        }
    }

    /// Look up a dotted key such as `contact.success`.
    ///
    /// Falls back to Spanish, then to the key itself.
    #[must_use]
    pub fn text(self, key: &str) -> &str {
        lookup(self.table(), key)
            .or_else(|| lookup(&ES, key))
            .unwrap_or(key)
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

fn lookup<'a>(table: &'a Value, key: &str) -> Option<&'a str> {
    key.split('.')
        .try_fold(table, |node, part| node.get(part))
        .and_then(Value::as_str)
}

static ES: Lazy<Value> = Lazy::new(|| {
    json!({
        "nav": {
            "about": "Sobre mí",
            "blog": "Blog",
            "contact": "Contacto",
            "projects": "Proyectos"
        },
        "hero": {
            "title": "Construyo software que funciona",
            "description": "Desarrollador enfocado en aplicaciones web, backend y herramientas. Aquí encontrarás mis proyectos y lo que voy aprendiendo.",
            "cta": "Ver proyectos"
        },
        "projects": {
            "title": "Proyectos",
            "description": "Una selección de trabajos, experimentos y casos de estudio."
        },
        "blog": {
            "title": "Blog",
            "description": "Notas sobre desarrollo, arquitectura y aprendizaje continuo.",
            "search": "Buscar artículos...",
            "allCategories": "Todas las categorías",
            "newest": "Más recientes",
            "oldest": "Más antiguos",
            "empty": "No se encontraron artículos.",
            "back": "Volver al Blog",
            "published": "Publicado",
            "readingTime": "min de lectura"
        },
        "about": {
            "title": "Sobre mí",
            "description": "Quién soy y cómo trabajo.",
            "banner": "Disponible para nuevos proyectos",
            "btn": "Contactar",
            "connect": "Conectemos",
            "stack": "Stack tecnológico",
            "story": "Mi historia"
        },
        "contact": {
            "title": "Contacto",
            "description": "¿Tienes una idea o una propuesta? Escríbeme.",
            "label": {
                "name": "Nombre",
                "email": "Correo electrónico",
                "message": "Mensaje"
            },
            "placeholder": {
                "name": "Tu nombre",
                "email": "tu@correo.com",
                "message": "Cuéntame en qué puedo ayudarte"
            },
            "btn": "Enviar mensaje",
            "success": "Mensaje enviado correctamente",
            "error": "Error guardando el mensaje.",
            "required": "Todos los campos son obligatorios",
            "invalid": "Solicitud no válida",
            "internal": "Error interno del servidor"
        }
    })
});

static EN: Lazy<Value> = Lazy::new(|| {
    json!({
        "nav": {
            "about": "About",
            "blog": "Blog",
            "contact": "Contact",
            "projects": "Projects"
        },
        "hero": {
            "title": "I build software that works",
            "description": "Developer focused on web applications, backends and tooling. Here you will find my projects and what I keep learning.",
            "cta": "View projects"
        },
        "projects": {
            "title": "Projects",
            "description": "A selection of work, experiments and case studies."
        },
        "blog": {
            "title": "Blog",
            "description": "Notes on development, architecture and continuous learning.",
            "search": "Search articles...",
            "allCategories": "All categories",
            "newest": "Newest",
            "oldest": "Oldest",
            "empty": "No articles found.",
            "back": "Back to Blog",
            "published": "Published",
            "readingTime": "min read"
        },
        "about": {
            "title": "About me",
            "description": "Who I am and how I work.",
            "banner": "Available for new projects",
            "btn": "Get in touch",
            "connect": "Let's connect",
            "stack": "Tech stack",
            "story": "My story"
        },
        "contact": {
            "title": "Contact",
            "description": "Have an idea or a proposal? Write to me.",
            "label": {
                "name": "Name",
                "email": "Email",
                "message": "Message"
            },
            "placeholder": {
                "name": "Your name",
                "email": "you@email.com",
                "message": "Tell me how I can help"
            },
            "btn": "Send message",
            "success": "Message sent successfully",
            "error": "Error saving the message.",
            "required": "All fields are required",
            "invalid": "Invalid request",
            "internal": "Internal server error"
        }
    })
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() {
        assert_eq!(Lang::from_code("en"), Some(Lang::En));
        assert_eq!(Lang::from_code("EN-gb"), Some(Lang::En));
        assert_eq!(Lang::from_code("es_MX"), Some(Lang::Es));
        assert_eq!(Lang::from_code("fr"), None);
    }

    #[test]
    fn test_from_accept_language() {
        assert_eq!(
            Lang::from_accept_language("fr-FR,en;q=0.8,es;q=0.5"),
            Some(Lang::En)
        );
        assert_eq!(
            Lang::from_accept_language("en;q=0.3, es-ES"),
            Some(Lang::Es)
        );
        assert_eq!(Lang::from_accept_language("de, fr"), None);
    }

    #[test]
    fn test_text_lookup() {
        assert_eq!(Lang::Es.text("contact.success"), "Mensaje enviado correctamente");
        assert_eq!(Lang::En.text("contact.success"), "Message sent successfully");
        assert_eq!(Lang::En.text("contact.label.email"), "Email");
        assert_eq!(Lang::En.text("missing.key"), "missing.key");
    }

    #[test]
    fn test_tables_share_sections() {
        for section in ["nav", "hero", "projects", "blog", "about", "contact"] {
            assert!(Lang::Es.table().get(section).is_some(), "es missing {section}");
            assert!(Lang::En.table().get(section).is_some(), "en missing {section}");
        }
    }
}
