//! Peer-mentoring and engagement conversations between sales partners

pub(super) const DEFAULT_INTENT: &str = "exploration";

pub(super) const PRIORITY: &[&str] = &[
    "problematic",
    "progress_oriented",
    "insightful",
    "supportive",
    "engaging",
    "reflective",
    "interested",
    "exploration",
];

pub(super) const PATTERNS: &[(&str, &[&str])] = &[
    (
        "interested",
        &[
            r"\binterested\b",
            r"\bwant to (learn|know|try)\b",
            r"\bsounds (great|good|useful|helpful)\b",
            r"\bcount me in\b",
            r"\bwould love to\b",
            r"\bkeen to\b",
            r"\bsign me up\b",
            r"\bhow do i join\b",
        ],
    ),
    (
        "engaging",
        &[
            r"\bhere'?s how i\b",
            r"\bwhat works for me\b",
            r"\bmy approach\b",
            r"\bi (usually|always|typically) (start|call|send|ask|follow)\b",
            r"\bin my experience\b",
            r"\bhas anyone else\b",
            r"\bwhat do you all think\b",
            r"\blet'?s discuss\b",
            r"\bsharing my\b",
            r"\btip:",
        ],
    ),
    (
        "exploration",
        &[
            r"\bwhat (is|are) (the|a|this)\b",
            r"\bhow (do|does|can) (i|you|we|it)\b",
            r"\banyone (know|tried|used)\b",
            r"\bcurious\b",
            r"\bwondering\b",
            r"\bnew here\b",
            r"\bwhere (do|can) i\b",
            r"\bis it possible\b",
        ],
    ),
    (
        "problematic",
        &[
            r"\bstruggl(e|es|ed|ing)\b",
            r"\bno one (replies|responds|answers|calls back)\b",
            r"\bnot getting (any )?(responses|replies|leads|calls)\b",
            r"\bstuck\b",
            r"\bfrustrat(ed|ing)\b",
            r"\bcan'?t (seem to )?(get|find|close|convert)\b",
            r"\bdoesn'?t work\b",
            r"\b(got|keep getting) rejected\b",
            r"\bignored\b",
            r"\bgiving up\b",
            r"\bdemotivated\b",
        ],
    ),
    (
        "insightful",
        &[
            r"\bi (learned|realized|noticed|discovered)\b",
            r"\bkey (takeaway|insight|lesson)s?\b",
            r"\bthe trick is\b",
            r"\bturns out\b",
            r"\bwhat i found is\b",
            r"\bthe data shows\b",
            r"\bpro tip\b",
            r"\bworks better (when|if|than)\b",
        ],
    ),
    (
        "progress_oriented",
        &[
            r"\b(closed|made|hit|reached|crossed)\b.*\b(deal|sale|target|goal|milestone)s?\b",
            r"\b\d+ (sales|deals|leads|clients|policies)\b",
            r"\bmy progress\b",
            r"\bimprov(ed|ing) my\b",
            r"\bthis (week|month) i\b",
            r"\bfinally (got|closed|converted)\b",
            r"\bnext goal\b",
            r"\bon track\b",
        ],
    ),
    (
        "supportive",
        &[
            r"\byou('ve)? got this\b",
            r"\bgreat (job|work)\b",
            r"\bwell done\b",
            r"\bcongrat(s|ulations)\b",
            r"\bhappy to help\b",
            r"\bdon'?t give up\b",
            r"\bkeep (going|it up)\b",
            r"\bproud of you\b",
            r"\bi can help\b",
            r"\bhere for you\b",
        ],
    ),
    (
        "reflective",
        &[
            r"\blooking back\b",
            r"\bi wonder if\b",
            r"\bin hindsight\b",
            r"\bi should have\b",
            r"\breflect(ing|ed)? on\b",
            r"\bthinking about why\b",
            r"\bmade me realize\b",
            r"\bi used to\b",
        ],
    ),
];
