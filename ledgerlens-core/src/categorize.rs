//! Keyword-based transaction categorization.
//!
//! First matching category wins, so the rule order below is load-bearing:
//! "fuel" must hit Transportation before "bill" can claim it for Bills.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Spending category assigned from the transaction description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "food-dining")]
    FoodDining,
    #[serde(rename = "shopping")]
    Shopping,
    #[serde(rename = "transportation")]
    Transportation,
    #[serde(rename = "utilities")]
    Utilities,
    #[serde(rename = "investment")]
    Investment,
    #[serde(rename = "entertainment")]
    Entertainment,
    #[serde(rename = "healthcare")]
    Healthcare,
    #[serde(rename = "transfer")]
    Transfer,
    #[serde(rename = "salary")]
    Salary,
    #[serde(rename = "bills")]
    Bills,
    #[serde(rename = "other")]
    Other,
}

impl Category {
    /// Human-readable label, used as the key in report maps
    pub fn label(&self) -> &'static str {
        match self {
            Category::FoodDining => "Food & Dining",
            Category::Shopping => "Shopping",
            Category::Transportation => "Transportation",
            Category::Utilities => "Utilities",
            Category::Investment => "Investment",
            Category::Entertainment => "Entertainment",
            Category::Healthcare => "Healthcare",
            Category::Transfer => "Transfer",
            Category::Salary => "Salary",
            Category::Bills => "Bills",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Keyword rules in priority order. Keywords are matched as case-insensitive
/// substrings of the description; entries with regex metacharacters (the
/// UPI transfer rule) are compiled as patterns instead.
const RULES: &[(Category, &[&str])] = &[
    (
        Category::FoodDining,
        &["swiggy", "zomato", "restaurant", "food", "cafe", "domino", "mcdonald", "kfc"],
    ),
    (
        Category::Shopping,
        &["amazon", "flipkart", "myntra", "ajio", "shop", "mall", "store"],
    ),
    (
        Category::Transportation,
        &["uber", "ola", "rapido", "petrol", "fuel", "parking"],
    ),
    (
        Category::Utilities,
        &["electricity", "water", "gas", "internet", "mobile", "recharge", "jio", "airtel"],
    ),
    (
        Category::Investment,
        &["groww", "zerodha", "upstox", "mutual fund", "sip", "investment"],
    ),
    (
        Category::Entertainment,
        &["netflix", "prime", "hotstar", "spotify", "movie", "theatre", "book"],
    ),
    (
        Category::Healthcare,
        &["medical", "pharmacy", "hospital", "doctor", "medicine", "health"],
    ),
    (
        Category::Transfer,
        &["neft", "imps", "rtgs", "transfer", r"upi-.*rao"],
    ),
    (Category::Salary, &["salary", "nextbillion", "payroll"]),
    (Category::Bills, &["bill", "payment", "autopay"]),
];

enum Matcher {
    Substring(&'static str),
    Pattern(Regex),
}

impl Matcher {
    fn matches(&self, desc: &str) -> bool {
        match self {
            Matcher::Substring(s) => desc.contains(s),
            Matcher::Pattern(re) => re.is_match(desc),
        }
    }
}

fn compiled_rules() -> &'static Vec<(Category, Vec<Matcher>)> {
    static RULES_CELL: OnceLock<Vec<(Category, Vec<Matcher>)>> = OnceLock::new();
    RULES_CELL.get_or_init(|| {
        RULES
            .iter()
            .map(|(cat, keywords)| {
                let matchers = keywords
                    .iter()
                    .map(|kw| {
                        if kw.contains(['.', '*', '[', '^', '$']) {
                            // The rule table is static, so a bad pattern is a
                            // programmer error caught by the tests below.
                            Matcher::Pattern(Regex::new(kw).expect("static rule pattern"))
                        } else {
                            Matcher::Substring(kw)
                        }
                    })
                    .collect();
                (*cat, matchers)
            })
            .collect()
    })
}

/// Categorize a transaction description. Missing descriptions map to Other.
pub fn categorize(description: Option<&str>) -> Category {
    let Some(desc) = description else {
        return Category::Other;
    };
    let desc = desc.to_lowercase();

    for (category, matchers) in compiled_rules() {
        if matchers.iter().any(|m| m.matches(&desc)) {
            return *category;
        }
    }

    Category::Other
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_food() {
        assert_eq!(categorize(Some("UPI-SWIGGY-ORDER-12345")), Category::FoodDining);
        assert_eq!(categorize(Some("Dominos Pizza Koramangala")), Category::FoodDining);
    }

    #[test]
    fn test_categorize_shopping() {
        assert_eq!(categorize(Some("AMAZON PAY INDIA")), Category::Shopping);
    }

    #[test]
    fn test_categorize_priority_order() {
        // "fuel" (Transportation) appears before "payment" (Bills) in rule order
        assert_eq!(categorize(Some("FUEL PAYMENT HPCL")), Category::Transportation);
        // "recharge" (Utilities) wins over "payment" (Bills)
        assert_eq!(categorize(Some("JIO RECHARGE PAYMENT")), Category::Utilities);
    }

    #[test]
    fn test_categorize_transfer_pattern() {
        // the UPI rule is a regex, not a plain substring
        assert_eq!(categorize(Some("UPI-RAGHAV RAO-OKAXIS")), Category::Transfer);
        assert_eq!(categorize(Some("NEFT CR HDFC0000123")), Category::Transfer);
    }

    #[test]
    fn test_categorize_salary_and_bills() {
        assert_eq!(categorize(Some("NEXTBILLION TECHNOLOGY SALARY")), Category::Salary);
        assert_eq!(categorize(Some("CREDIT CARD AUTOPAY")), Category::Bills);
    }

    #[test]
    fn test_categorize_fallback() {
        assert_eq!(categorize(Some("MISC ADJUSTMENT")), Category::Other);
        assert_eq!(categorize(None), Category::Other);
    }

    #[test]
    fn test_all_rules_compile() {
        // Forces the OnceLock init; a bad static pattern panics here, not in prod
        assert_eq!(compiled_rules().len(), RULES.len());
    }

    #[test]
    fn test_labels_are_unique() {
        let mut labels: Vec<&str> = RULES.iter().map(|(c, _)| c.label()).collect();
        labels.push(Category::Other.label());
        let count = labels.len();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), count);
    }
}
