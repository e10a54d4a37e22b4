use crate::language::Language;

/// Classification of a call expression by energy category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallClass {
    Io,
    Network,
    Allocation,
    Plain,
}

/// Per-language sets of call names and dotted-path substrings that mark a
/// call as I/O, network, or allocation.
///
/// `names` match the short (rightmost) name of a call exactly; `paths` match
/// as substrings of the full dotted call text (`sys.stdout.write`).
pub struct ClassifierSets {
    pub io_names: &'static [&'static str],
    pub io_paths: &'static [&'static str],
    pub net_names: &'static [&'static str],
    pub net_paths: &'static [&'static str],
    pub alloc_names: &'static [&'static str],
    pub alloc_paths: &'static [&'static str],
}

static PYTHON: ClassifierSets = ClassifierSets {
    io_names: &[
        "print", "input", "open", "read", "write", "readline", "readlines", "writelines",
        "close", "flush", "seek", "tell",
    ],
    io_paths: &["print", "write", "read", "input", "open"],
    net_names: &[
        "request", "get", "post", "put", "delete", "patch", "urlopen", "connect", "send",
        "recv", "socket", "fetch", "download", "upload",
    ],
    net_paths: &["request", "urlopen", "socket", "fetch"],
    alloc_names: &[
        "list", "dict", "set", "tuple", "bytearray", "array", "zeros", "ones", "empty",
        "malloc", "calloc", "DataFrame", "Series", "ndarray", "deepcopy", "copy",
    ],
    alloc_paths: &[],
};

static JAVA: ClassifierSets = ClassifierSets {
    io_names: &["println", "printf", "print", "read", "write", "readLine"],
    io_paths: &[
        "System.out", "System.err", "System.in", "Scanner", "BufferedReader", "FileReader",
        "FileWriter", "PrintWriter",
    ],
    net_names: &[],
    net_paths: &[
        "HttpURLConnection", "URL", "Socket", "ServerSocket", "HttpClient", "HttpRequest",
        "RestTemplate", "WebClient",
    ],
    alloc_names: &[],
    alloc_paths: &[],
};

static C: ClassifierSets = ClassifierSets {
    io_names: &[
        "printf", "scanf", "fprintf", "fscanf", "fopen", "fclose", "fread", "fwrite", "puts",
        "gets", "getchar", "putchar", "fgets", "fputs",
    ],
    io_paths: &[],
    net_names: &["socket", "connect", "send", "recv", "bind", "listen", "accept"],
    net_paths: &["curl_"],
    alloc_names: &["malloc", "calloc", "realloc", "free", "alloca"],
    alloc_paths: &[],
};

static CPP: ClassifierSets = ClassifierSets {
    io_names: &["printf", "scanf", "getline"],
    io_paths: &["cout", "cin", "cerr", "clog", "ifstream", "ofstream", "fstream"],
    net_names: &["socket", "connect", "send", "recv"],
    net_paths: &["boost::asio", "curl_", "httplib"],
    alloc_names: &["malloc", "calloc", "make_shared", "make_unique"],
    alloc_paths: &["std::vector", "std::map", "std::unordered_map"],
};

static JAVASCRIPT: ClassifierSets = ClassifierSets {
    io_names: &["alert", "prompt", "confirm", "readFile", "writeFile"],
    io_paths: &[
        "console.", "document.write", "fs.", "process.stdin", "process.stdout",
        "process.stderr",
    ],
    net_names: &["fetch"],
    net_paths: &[
        "axios", "XMLHttpRequest", "http.request", "https.request", "WebSocket",
        "net.connect",
    ],
    alloc_names: &["Array", "Map", "Set"],
    alloc_paths: &["Object.create"],
};

/// The classifier sets for a language. TypeScript reuses JavaScript.
pub fn sets_for(lang: Language) -> &'static ClassifierSets {
    match lang {
        Language::Python => &PYTHON,
        Language::Java => &JAVA,
        Language::C => &C,
        Language::Cpp => &CPP,
        Language::JavaScript | Language::TypeScript => &JAVASCRIPT,
    }
}

/// Classify a call by its short name and, when available, its full dotted
/// path. Short I/O names win over everything, then dotted I/O paths, then
/// network, then allocation.
pub fn classify(lang: Language, name: &str, full_path: Option<&str>) -> CallClass {
    let sets = sets_for(lang);
    let path_contains = |needles: &[&str]| {
        full_path.is_some_and(|p| needles.iter().any(|n| p.contains(n)))
    };

    if sets.io_names.contains(&name) || path_contains(sets.io_paths) {
        CallClass::Io
    } else if sets.net_names.contains(&name) || path_contains(sets.net_paths) {
        CallClass::Network
    } else if sets.alloc_names.contains(&name) || path_contains(sets.alloc_paths) {
        CallClass::Allocation
    } else {
        CallClass::Plain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn python_print_is_io() {
        assert_eq!(classify(Language::Python, "print", None), CallClass::Io);
    }

    #[test]
    fn io_short_name_beats_network_path() {
        // "read" is an I/O short name even when the dotted path would match
        // a network substring.
        assert_eq!(
            classify(Language::Python, "read", Some("requests.read")),
            CallClass::Io
        );
    }

    #[test]
    fn python_dotted_io_path() {
        assert_eq!(
            classify(Language::Python, "method", Some("sys.stdout.write_through")),
            CallClass::Io
        );
    }

    #[test]
    fn python_network_and_alloc() {
        assert_eq!(classify(Language::Python, "urlopen", None), CallClass::Network);
        assert_eq!(classify(Language::Python, "dict", None), CallClass::Allocation);
        assert_eq!(classify(Language::Python, "compute", None), CallClass::Plain);
    }

    #[test]
    fn c_classification() {
        assert_eq!(classify(Language::C, "printf", None), CallClass::Io);
        assert_eq!(classify(Language::C, "recv", None), CallClass::Network);
        assert_eq!(classify(Language::C, "malloc", None), CallClass::Allocation);
        assert_eq!(
            classify(Language::C, "curl_easy_perform", Some("curl_easy_perform")),
            CallClass::Network
        );
    }

    #[test]
    fn java_dotted_paths() {
        assert_eq!(
            classify(Language::Java, "println", Some("System.out.println")),
            CallClass::Io
        );
        assert_eq!(
            classify(Language::Java, "send", Some("HttpClient.newHttpClient.send")),
            CallClass::Network
        );
    }

    #[test]
    fn javascript_console_and_fetch() {
        assert_eq!(
            classify(Language::JavaScript, "log", Some("console.log")),
            CallClass::Io
        );
        assert_eq!(classify(Language::JavaScript, "fetch", None), CallClass::Network);
        assert_eq!(classify(Language::JavaScript, "Map", None), CallClass::Allocation);
    }

    #[test]
    fn typescript_reuses_javascript() {
        assert_eq!(
            classify(Language::TypeScript, "warn", Some("console.warn")),
            CallClass::Io
        );
    }
}
