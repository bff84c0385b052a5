use std::collections::BTreeMap;
use ansi_term::{Colour, Style};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use crate::{db::AccountStore, model::verdict::{ClassificationPolicy, PasswordStatus, RiskVerdict}};

/// Accounts with no department are grouped under this name.
pub const UNKNOWN_DEPARTMENT: &str = "Unknown";

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct DepartmentStats {
    pub weak: usize,
    pub common: usize,
    pub personal: usize,
}

///
/// How many accounts suffer from each of the headline weaknesses. An account can count in several.
///
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct WeaknessBreakdown {
    pub missing_upper: usize,
    pub missing_digit: usize,
    pub common: usize,
    pub personal_info: usize,
}

///
/// Something wrong with an account's password, as shown to an administrator.
///
#[derive(Clone, Copy, Debug, Deserialize, Display, Serialize, PartialEq, Eq)]
pub enum Reason {
    #[display(fmt = "Common password")]
    CommonPassword,
    #[display(fmt = "Not checked for common passwords")]
    NotDictionaryChecked,
    #[display(fmt = "Uses personal info")]
    PersonalInfo,
    #[display(fmt = "Too short")]
    TooShort,
    #[display(fmt = "No uppercase letter")]
    NoUppercase,
    #[display(fmt = "No digit")]
    NoDigit,
    #[display(fmt = "No special character")]
    NoSpecial,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct AccountReasons {
    pub email: String,
    pub status: PasswordStatus,
    pub reasons: Vec<Reason>,
}

///
/// Aggregate password security across every stored account.
///
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct SecuritySummary {
    pub total: usize,
    pub strong: usize,
    pub weak: usize,
    pub common: usize,
    pub personal_info_used: usize,
    pub unchecked: usize,   // Common status unknown - the dictionary wasn't available.
    pub weaknesses: WeaknessBreakdown,
    pub by_department: BTreeMap<String, DepartmentStats>,
    pub at_risk: Vec<AccountReasons>,  // Every account with at least one reason, by email.
}

///
/// Everything wrong with the password a verdict describes. Empty for a flawless password.
///
/// Reasons come straight from the stored flags, so they don't depend on the classification policy.
///
pub fn reasons(verdict: &RiskVerdict) -> Vec<Reason> {
    let flags = &verdict.flags;

    vec!(
        (verdict.common_password == Some(true), Reason::CommonPassword),
        (verdict.common_password.is_none(),     Reason::NotDictionaryChecked),
        (verdict.used_personal_info,            Reason::PersonalInfo),
        (!flags.length_ok,                      Reason::TooShort),
        (!flags.has_upper,                      Reason::NoUppercase),
        (!flags.has_digit,                      Reason::NoDigit),
        (!flags.has_special,                    Reason::NoSpecial),
    )
    .into_iter()
    .filter(|(applies, _)| *applies)
    .map(|(_, reason)| reason)
    .collect()
}

///
/// Summarise the stored verdicts, labelling each with the policy given.
///
pub fn summarize(store: &dyn AccountStore, policy: &ClassificationPolicy) -> SecuritySummary {
    let mut summary = SecuritySummary::default();

    for account in store.accounts() {
        let verdict = &account.verdict;
        let status = verdict.status(policy);

        summary.total += 1;
        match status {
            PasswordStatus::Strong => summary.strong += 1,
            PasswordStatus::Weak   => summary.weak += 1,
            PasswordStatus::Common => summary.common += 1,
        }

        if verdict.used_personal_info {
            summary.personal_info_used += 1;
        }

        if verdict.common_password.is_none() {
            summary.unchecked += 1;
        }

        let reasons = reasons(verdict);
        for reason in &reasons {
            match reason {
                Reason::NoUppercase    => summary.weaknesses.missing_upper += 1,
                Reason::NoDigit        => summary.weaknesses.missing_digit += 1,
                Reason::CommonPassword => summary.weaknesses.common += 1,
                Reason::PersonalInfo   => summary.weaknesses.personal_info += 1,
                _ => {},
            }
        }

        let department = account.record.department()
            .map(|department| department.trim().to_string())
            .unwrap_or_else(|| UNKNOWN_DEPARTMENT.to_string());

        let stats = summary.by_department.entry(department).or_default();
        match status {
            PasswordStatus::Weak   => stats.weak += 1,
            PasswordStatus::Common => stats.common += 1,
            PasswordStatus::Strong => {},
        }

        if verdict.used_personal_info {
            stats.personal += 1;
        }

        if !reasons.is_empty() {
            summary.at_risk.push(AccountReasons { email: account.email().to_string(), status, reasons });
        }
    }

    summary
}

impl SecuritySummary {
    ///
    /// The percentage of accounts with a Strong password, rounded. Zero when there are no accounts.
    ///
    pub fn score(&self) -> u32 {
        match self.total {
            0 => 0,
            total => ((self.strong as f64 / total as f64) * 100.0).round() as u32,
        }
    }

    ///
    /// Pretty-print the summary for a terminal.
    ///
    pub fn fmt_console(&self) -> String {
        let heading = Style::new().bold();
        let row = |label: &str, value: String| format!("{:>24}: {}", label, value);

        let mut lines = vec!(
            heading.paint("Password security summary").to_string(),
            row("Security score", format!("{}%", self.score())),
            row("Accounts", self.total.to_string()),
            row("Strong", Colour::Green.paint(self.strong.to_string()).to_string()),
            row("Weak", Colour::Yellow.paint(self.weak.to_string()).to_string()),
            row("Common", Colour::Red.paint(self.common.to_string()).to_string()),
            row("Personal info used", Colour::Red.paint(self.personal_info_used.to_string()).to_string()),
        );

        if self.unchecked > 0 {
            lines.push(row("Not dictionary checked", Colour::Purple.paint(self.unchecked.to_string()).to_string()));
        }

        lines.push(String::new());
        lines.push(heading.paint("Weaknesses").to_string());
        lines.push(row("Missing uppercase", self.weaknesses.missing_upper.to_string()));
        lines.push(row("Missing digit", self.weaknesses.missing_digit.to_string()));
        lines.push(row("Common password", self.weaknesses.common.to_string()));
        lines.push(row("Used personal info", self.weaknesses.personal_info.to_string()));

        if !self.by_department.is_empty() {
            lines.push(String::new());
            lines.push(heading.paint(format!("{:>24}  {:>6} {:>6} {:>8}", "Department", "Weak", "Common", "Personal")).to_string());

            lines.extend(self.by_department.iter().map(|(department, stats)|
                format!("{:>24}  {:>6} {:>6} {:>8}", department, stats.weak, stats.common, stats.personal)));
        }

        if !self.at_risk.is_empty() {
            lines.push(String::new());
            lines.push(heading.paint("Accounts at risk").to_string());

            lines.extend(self.at_risk.iter().map(|account| {
                let reasons = account.reasons.iter().map(Reason::to_string).collect::<Vec<_>>().join(", ");
                format!("{:>24}  {:<6}  {}", account.email, account.status.to_string(), reasons)
            }));
        }

        lines.join("\n") + "\n"
    }
}
