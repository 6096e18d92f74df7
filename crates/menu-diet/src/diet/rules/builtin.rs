//! Built-in rule tables. Terms are written in plain form; the registry normalizes them.
//! Menus come from German and English delivery providers, so both vocabularies are covered.
//! Editing anything here changes scores and requires an `ENGINE_VERSION` bump.

pub(super) struct BuiltinTag {
    pub key: &'static str,
    pub keywords: &'static [&'static str],
    pub dishes: &'static [&'static str],
    pub allergen_exclusions: &'static [&'static str],
    pub negative_keywords: &'static [&'static [&'static str]],
    pub qualifiers: &'static [&'static str],
    pub qualified_negatives: &'static [&'static str],
    pub contradictions: &'static [&'static str],
}

pub(super) const MEAT_TERMS: &[&str] = &[
    "chicken", "huhn", "hahnchen", "hendl", "beef", "rind", "rindfleisch", "pork", "schwein",
    "schweinefleisch", "lamb", "lamm", "bacon", "speck", "ham", "schinken", "salami", "turkey",
    "pute", "duck", "ente", "veal", "kalb", "sausage", "wurst", "bratwurst", "meat", "fleisch",
    "hackfleisch", "mince", "chorizo", "pepperoni", "prosciutto", "pancetta", "gyros",
];

pub(super) const FISH_TERMS: &[&str] = &[
    "fish", "fisch", "tuna", "thunfisch", "salmon", "lachs", "shrimp", "prawn", "garnelen",
    "anchovy", "anchovies", "sardellen", "crab", "lobster", "squid", "calamari", "oyster",
    "mussels", "muscheln",
];

const DAIRY_TERMS: &[&str] = &[
    "milk", "milch", "dairy", "cheese", "kase", "butter", "cream", "sahne", "yogurt", "joghurt",
    "quark", "mozzarella", "parmesan", "feta", "mascarpone", "ricotta", "buttermilk", "lactose",
    "laktose",
];

const EGG_TERMS: &[&str] = &["egg", "ei", "eier", "mayonnaise", "mayo", "aioli"];

const ANIMAL_EXTRAS: &[&str] = &["honey", "honig", "gelatin", "gelatine"];

const GLUTEN_TERMS: &[&str] = &[
    "gluten", "wheat", "weizen", "flour", "mehl", "bread", "brot", "bun", "bagel", "pasta",
    "noodles", "nudeln", "spaghetti", "couscous", "bulgur", "barley", "gerste", "rye", "roggen",
    "spelt", "dinkel", "seitan", "breaded", "paniert", "beer", "bier", "croutons",
];

const HARAM_TERMS: &[&str] = &[
    "pork", "schwein", "schweinefleisch", "bacon", "speck", "ham", "schinken", "salami",
    "chorizo", "prosciutto", "pancetta", "lard", "schmalz", "wine", "wein", "beer", "bier",
    "alcohol", "alkohol", "rum",
];

/// Milk words that a strong lactose-free phrase neutralizes ("oat milk", "dairy-free milk").
pub(super) const MILK_TERMS: &[&str] = &["milk", "milch", "dairy", "lactose", "laktose"];

pub(super) const LACTOSE_FREE_PHRASES: &[&str] = &[
    "lactose-free", "laktosefrei", "dairy-free", "milchfrei", "non-dairy", "oat milk",
    "hafermilch", "soy milk", "sojamilch", "almond milk", "mandelmilch", "coconut milk",
    "kokosmilch", "rice milk", "reismilch", "plant milk", "pflanzenmilch",
];

/// Words a diet keyword can modify without saying anything about the main dish.
pub(super) const SIDE_TERMS: &[&str] = &[
    "sauce", "sosse", "sose", "dip", "dressing", "mayo", "mayonnaise", "aioli", "side", "beilage",
    "topping", "option", "alternative",
];

/// Words that negate the term that follows them.
pub(super) const NEGATORS: &[&str] = &[
    "no", "not", "without", "ohne", "kein", "keine", "keinen", "keiner", "non", "sans", "zero",
    "free", "frei",
];

pub(super) const CLAIM_PREFIXES: &[&str] = &[
    "is", "are", "100%", "100 %", "fully", "completely", "certified", "strictly", "entirely",
    "rein", "komplett", "ganz", "zu 100%", "zertifiziert",
];

pub(super) const CROSS_CONTAMINATION: &[&str] = &[
    r"\bmay contain\b",
    r"\btraces? of\b",
    r"\bspuren\b",
    r"\bkann spuren\b",
    r"\bshared (?:fryer|fryers|equipment|kitchen|grill|oil)\b",
    r"\bgemeinsame[nr]? (?:fritteuse|kuche|geraten|ol)\b",
    r"\bcross[\s\-]?contamination\b",
    r"\bkreuzkontamination\b",
    r"\b(?:produced|prepared|made) in a (?:facility|kitchen) (?:that|which) (?:also )?(?:handles|processes|uses)\b",
    r"\bin einem betrieb hergestellt\b",
];

pub(super) const SUBDIETS: &[(&str, &str)] = &[("VEGAN", "VEGETARIAN")];

pub(super) const TAGS: &[BuiltinTag] = &[
    BuiltinTag {
        key: "VEGAN",
        keywords: &[
            "vegan", "vegane", "veganer", "veganes", "veganen", "plant-based", "pflanzlich",
            "pflanzliche", "tofu", "tempeh", "seitan", "beyond meat",
        ],
        dishes: &[
            "falafel", "hummus", "chana masala", "aloo gobi", "dal tadka", "baba ganoush",
            "edamame", "gemuse curry",
        ],
        allergen_exclusions: &[
            "milk", "milch", "milchprodukte", "lactose", "laktose", "egg", "eggs", "eier", "fish",
            "fisch", "crustaceans", "krebstiere", "molluscs", "weichtiere", "honey",
        ],
        negative_keywords: &[MEAT_TERMS, FISH_TERMS, DAIRY_TERMS, EGG_TERMS, ANIMAL_EXTRAS],
        qualifiers: &["vegan", "vegane", "veganer", "veganes", "veganen", "plant-based"],
        qualified_negatives: &[
            "chicken", "hahnchen", "sausage", "wurst", "bratwurst", "meat", "fleisch", "mince",
            "hackfleisch", "gyros", "cheese", "kase", "mayo", "mayonnaise", "aioli", "butter",
            "cream", "milk", "milch", "yogurt", "joghurt", "mozzarella", "salami", "tuna",
            "thunfisch",
        ],
        contradictions: &[
            r"\bcontains? (?:dairy|milk|eggs?|honey|meat|fish|gelatine?)\b",
            r"\bnot vegan\b",
            r"\bnon[\s\-]?vegan\b",
            r"\bnicht vegan\b",
            r"\benthalt (?:milch|eier?|honig|fleisch|fisch)\b",
        ],
    },
    BuiltinTag {
        key: "VEGETARIAN",
        keywords: &[
            "vegetarian", "vegetarisch", "vegetarische", "vegetarischer", "vegetarisches",
            "vegetarischen", "veggie", "meatless", "fleischlos", "paneer", "halloumi",
        ],
        dishes: &[
            "margherita", "caprese", "palak paneer", "paneer tikka", "spanakopita",
            "quattro formaggi", "kasespatzle", "caprese salad", "mac and cheese",
        ],
        allergen_exclusions: &[
            "fish", "fisch", "crustaceans", "krebstiere", "molluscs", "weichtiere",
        ],
        negative_keywords: &[MEAT_TERMS, FISH_TERMS, &["gelatin", "gelatine"]],
        qualifiers: &[
            "vegetarian", "vegetarisch", "vegetarische", "vegetarischer", "vegetarisches",
            "vegetarischen", "veggie", "meatless", "fleischlos",
        ],
        qualified_negatives: &[
            "chicken", "hahnchen", "sausage", "wurst", "bratwurst", "meat", "fleisch", "mince",
            "hackfleisch", "gyros", "salami", "tuna", "thunfisch",
        ],
        contradictions: &[
            r"\bnot vegetarian\b",
            r"\bnon[\s\-]?vegetarian\b",
            r"\bnicht vegetarisch\b",
            r"\bcontains? (?:meat|fish|gelatine?)\b",
            r"\benthalt (?:fleisch|fisch|gelatine)\b",
        ],
    },
    BuiltinTag {
        key: "GLUTEN_FREE",
        keywords: &[
            "gluten-free", "glutenfrei", "glutenfreie", "glutenfreier", "glutenfreies",
            "without gluten", "ohne gluten", "zoeliakie", "celiac",
        ],
        dishes: &["sashimi", "risotto", "polenta", "paella", "ceviche", "pho"],
        allergen_exclusions: &[
            "gluten", "wheat", "weizen", "barley", "gerste", "rye", "roggen", "spelt", "dinkel",
            "oats", "hafer", "cereals containing gluten", "glutenhaltiges getreide",
        ],
        negative_keywords: &[GLUTEN_TERMS],
        qualifiers: &[
            "gluten-free", "glutenfrei", "glutenfreie", "glutenfreier", "glutenfreies",
        ],
        qualified_negatives: &[
            "bread", "brot", "bun", "bagel", "pasta", "noodles", "nudeln", "spaghetti", "flour",
            "mehl", "beer", "bier", "breaded", "paniert",
        ],
        contradictions: &[
            r"\bcontains? gluten\b",
            r"\bnot gluten[\s\-]?free\b",
            r"\benthalt gluten\b",
            r"\bnicht glutenfrei\b",
        ],
    },
    BuiltinTag {
        key: "LACTOSE_FREE",
        keywords: &[
            "lactose-free", "laktosefrei", "laktosefreie", "laktosefreier", "laktosefreies",
            "dairy-free", "milchfrei", "non-dairy", "oat milk", "hafermilch", "soy milk",
            "sojamilch", "almond milk", "mandelmilch", "vegan", "vegane", "veganer", "veganes",
        ],
        dishes: &["sorbet"],
        allergen_exclusions: &["milk", "milch", "milchprodukte", "lactose", "laktose"],
        negative_keywords: &[DAIRY_TERMS],
        qualifiers: &[
            "lactose-free", "laktosefrei", "laktosefreie", "laktosefreier", "laktosefreies",
            "dairy-free", "milchfrei",
        ],
        qualified_negatives: &[
            "milk", "milch", "cheese", "kase", "yogurt", "joghurt", "cream", "sahne", "mozzarella",
            "quark", "butter",
        ],
        contradictions: &[
            r"\bcontains? (?:dairy|milk|lactose)\b",
            r"\bnot (?:lactose|dairy)[\s\-]?free\b",
            r"\benthalt (?:milch|laktose)\b",
            r"\bnicht laktosefrei\b",
        ],
    },
    BuiltinTag {
        key: "HALAL",
        keywords: &["halal", "helal", "zabiha", "zabihah"],
        dishes: &[],
        allergen_exclusions: &["pork", "schwein", "alcohol", "alkohol"],
        negative_keywords: &[HARAM_TERMS],
        qualifiers: &["halal", "helal"],
        qualified_negatives: &["salami"],
        contradictions: &[
            r"\bnot halal\b",
            r"\bnon[\s\-]?halal\b",
            r"\bnicht halal\b",
            r"\bcontains? (?:pork|alcohol)\b",
            r"\benthalt (?:schwein|alkohol)\b",
        ],
    },
];
