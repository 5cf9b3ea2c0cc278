const HEALTH_PARAM: &str = "health";
const HEALTH_VALUE: &str = "check";

/// True when the liveness marker `health=check` is present among the request
/// parameters. Callers short-circuit with a plain "OK" and never touch the
/// generation adapter.
pub fn is_health_check<'a, I>(params: I) -> bool
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    params
        .into_iter()
        .any(|(key, value)| key == HEALTH_PARAM && value == HEALTH_VALUE)
}

/// Splits `key=value` arguments into parameter pairs; anything without an
/// equals sign is not a parameter.
pub fn parse_query_pairs(args: &[String]) -> Vec<(&str, &str)> {
    args.iter()
        .filter_map(|arg| arg.split_once('='))
        .collect()
}
