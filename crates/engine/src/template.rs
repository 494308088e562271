use serde::Serialize;

use crate::normalize::normalize;

/// What the assembler puts into a template column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    /// `PROCESSO`: copied from the resolved process column.
    Process,
    /// `EVENTO`: copied from the event's resolved amount column.
    EventAmount,
    /// `DATA`: today's date.
    Date,
    /// `RESULT`: constant "OK".
    Status,
    /// `SOLICITADO_POR`: requester id.
    Requester,
    /// `EVENTO_INTEGRACAO`: event id.
    EventId,
    /// Anything else stays empty.
    Other,
}

impl ColumnRole {
    /// Recognize a template header by its comparison key.
    pub fn of(header: &str) -> Self {
        match normalize(header).as_str() {
            "processo" => ColumnRole::Process,
            "evento" => ColumnRole::EventAmount,
            "data" => ColumnRole::Date,
            "result" => ColumnRole::Status,
            "solicitado_por" => ColumnRole::Requester,
            "evento_integracao" => ColumnRole::EventId,
            _ => ColumnRole::Other,
        }
    }
}

/// Ordered output column names read from the template's header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateColumns {
    columns: Vec<String>,
}

impl TemplateColumns {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { columns: columns.into_iter().map(Into::into).collect() }
    }

    pub fn names(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn roles(&self) -> impl Iterator<Item = (&str, ColumnRole)> {
        self.columns.iter().map(|c| (c.as_str(), ColumnRole::of(c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_fixed_headers() {
        assert_eq!(ColumnRole::of("PROCESSO"), ColumnRole::Process);
        assert_eq!(ColumnRole::of(" Evento "), ColumnRole::EventAmount);
        assert_eq!(ColumnRole::of("DATA"), ColumnRole::Date);
        assert_eq!(ColumnRole::of("RESULT"), ColumnRole::Status);
        assert_eq!(ColumnRole::of("SOLICITADO_POR"), ColumnRole::Requester);
        assert_eq!(ColumnRole::of("EVENTO_INTEGRAÇÃO"), ColumnRole::EventId);
        assert_eq!(ColumnRole::of("OBSERVACAO"), ColumnRole::Other);
    }

    #[test]
    fn keeps_template_order() {
        let t = TemplateColumns::new(["EVENTO", "PROCESSO", "EXTRA"]);
        let roles: Vec<_> = t.roles().map(|(_, r)| r).collect();
        assert_eq!(roles, [ColumnRole::EventAmount, ColumnRole::Process, ColumnRole::Other]);
    }
}
