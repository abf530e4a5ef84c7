//! Static KQL vocabulary used for local suggestions

/// Tabular operators that follow a pipe
pub const OPERATORS: &[&str] = &[
    "where",
    "project",
    "extend",
    "summarize",
    "join",
    "union",
    "take",
    "limit",
    "top",
    "sort",
    "order",
    "distinct",
    "count",
    "render",
    "parse",
    "evaluate",
    "invoke",
    "mv-expand",
    "make-series",
    "serialize",
    "range",
];

/// Aggregation functions valid inside `summarize`
pub const AGGREGATION_FUNCTIONS: &[&str] = &[
    "count()",
    "sum(",
    "avg(",
    "min(",
    "max(",
    "dcount(",
    "percentile(",
    "stdev(",
    "variance(",
    "countif(",
    "sumif(",
    "avgif(",
    "minif(",
    "maxif(",
    "make_list(",
    "make_set(",
    "arg_max(",
    "arg_min(",
];

/// Comparison and logical operators used in predicates
pub const COMPARISON_OPERATORS: &[&str] = &[
    "==",
    "!=",
    "<",
    ">",
    "<=",
    ">=",
    "contains",
    "has",
    "startswith",
    "endswith",
    "matches regex",
    "in",
    "!in",
    "between",
    "and",
    "or",
    "not",
];

/// Date and time functions
pub const TIME_FUNCTIONS: &[&str] = &[
    "ago(",
    "now()",
    "datetime(",
    "timespan(",
    "startofday(",
    "startofweek(",
    "startofmonth(",
    "endofday(",
    "endofweek(",
    "endofmonth(",
    "bin(",
    "format_datetime(",
];

const COMMON_OPERATORS: &[&str] = &["where", "project", "take", "summarize"];

const COMMON_COLUMNS: &[&str] = &["TimeGenerated", "ResourceId", "OperationName"];

/// Operators that get a ranking boost
pub fn is_common_operator(op: &str) -> bool {
    COMMON_OPERATORS.contains(&op)
}

/// Columns that get a ranking boost
pub fn is_common_column(column: &str) -> bool {
    COMMON_COLUMNS.contains(&column)
}

/// Functions that get a ranking boost
pub fn is_common_function(function: &str) -> bool {
    function.starts_with("count") || function.starts_with("sum")
}

/// Whether `word` is a tabular operator (case-insensitive)
pub fn is_operator(word: &str) -> bool {
    OPERATORS.iter().any(|op| op.eq_ignore_ascii_case(word))
}

/// Whether `word` is a word-like comparison or logical operator (case-insensitive)
pub fn is_word_operator(word: &str) -> bool {
    COMPARISON_OPERATORS
        .iter()
        .filter(|op| op.starts_with(|c: char| c.is_ascii_alphabetic()))
        .flat_map(|op| op.split(' '))
        .any(|op| op.eq_ignore_ascii_case(word))
}

/// Whether `word` names a known function, with or without the parenthesis
pub fn is_function(word: &str) -> bool {
    AGGREGATION_FUNCTIONS
        .iter()
        .chain(TIME_FUNCTIONS)
        .map(|f| f.trim_end_matches(['(', ')']))
        .any(|f| f.eq_ignore_ascii_case(word))
}
