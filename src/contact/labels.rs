//! Display names for the coded `service` and `urgency` select options.
//!
//! Codes that are not in a table pass through unchanged.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Embalaje,
    Cargue,
    Descargue,
    Completo,
}

impl Service {
    pub const ALL: [Service; 4] = [
        Service::Embalaje,
        Service::Cargue,
        Service::Descargue,
        Service::Completo,
    ];

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }

    pub fn code(self) -> &'static str {
        match self {
            Service::Embalaje => "embalaje",
            Service::Cargue => "cargue",
            Service::Descargue => "descargue",
            Service::Completo => "completo",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Service::Embalaje => "Embalaje Profesional",
            Service::Cargue => "Cargue de Paquetes",
            Service::Descargue => "Descargue de Paquetes",
            Service::Completo => "Servicio Completo (Embalaje + Cargue + Descargue)",
        }
    }

    pub fn resolve(code: &str) -> &str {
        Self::from_code(code).map_or(code, |v| v.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Normal,
    Express,
    Urgent,
}

impl Urgency {
    pub const ALL: [Urgency; 3] = [Urgency::Normal, Urgency::Express, Urgency::Urgent];

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|u| u.code() == code)
    }

    pub fn code(self) -> &'static str {
        match self {
            Urgency::Normal => "normal",
            Urgency::Express => "express",
            Urgency::Urgent => "urgent",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Urgency::Normal => "Normal (3-5 días)",
            Urgency::Express => "Express (1-2 días)",
            Urgency::Urgent => "Urgente (Mismo día)",
        }
    }

    pub fn resolve(code: &str) -> &str {
        Self::from_code(code).map_or(code, |v| v.label())
    }
}
