//! A small, hardcoded catalog of common JDK class short names to their
//! fully-qualified name, used only to propose an import for an unresolved
//! class that never appeared in any workspace file (spec.md §4.12 "Code
//! Actions": "propose imports by scanning Symbol Index + classpath for
//! classes named X"). The classpath navigator itself never extracts JDK
//! sources (documented Open Question in DESIGN.md), so this catalog is
//! the pragmatic stand-in for "classpath" in that sentence — it only ever
//! supplies an import statement's text, never a navigable location.

const WELL_KNOWN: &[(&str, &str)] = &[
    ("ArrayList", "java.util.ArrayList"),
    ("LinkedList", "java.util.LinkedList"),
    ("HashMap", "java.util.HashMap"),
    ("LinkedHashMap", "java.util.LinkedHashMap"),
    ("TreeMap", "java.util.TreeMap"),
    ("HashSet", "java.util.HashSet"),
    ("LinkedHashSet", "java.util.LinkedHashSet"),
    ("TreeSet", "java.util.TreeSet"),
    ("List", "java.util.List"),
    ("Map", "java.util.Map"),
    ("Set", "java.util.Set"),
    ("Collection", "java.util.Collection"),
    ("Collections", "java.util.Collections"),
    ("Optional", "java.util.Optional"),
    ("Date", "java.util.Date"),
    ("UUID", "java.util.UUID"),
    ("Scanner", "java.util.Scanner"),
    ("Pattern", "java.util.regex.Pattern"),
    ("Matcher", "java.util.regex.Matcher"),
    ("BigDecimal", "java.math.BigDecimal"),
    ("BigInteger", "java.math.BigInteger"),
    ("File", "java.io.File"),
    ("IOException", "java.io.IOException"),
    ("InputStream", "java.io.InputStream"),
    ("OutputStream", "java.io.OutputStream"),
    ("StringBuilder", "java.lang.StringBuilder"),
    ("Path", "java.nio.file.Path"),
    ("Paths", "java.nio.file.Paths"),
    ("Files", "java.nio.file.Files"),
    ("Duration", "java.time.Duration"),
    ("Instant", "java.time.Instant"),
    ("LocalDate", "java.time.LocalDate"),
    ("LocalDateTime", "java.time.LocalDateTime"),
];

/// Resolves a bare class name to a fully-qualified JDK class name, if this
/// catalog knows one. Returns `None` for anything not in the small fixed
/// table above, including every user-declared class (those are found
/// through the Symbol Index instead, not this catalog).
pub fn resolve(class_name: &str) -> Option<&'static str> {
    WELL_KNOWN.iter().find(|(short, _)| *short == class_name).map(|(_, fqn)| *fqn)
}
