//! Financial-product sales funnel (insurance, loans, credit)

pub(super) const DEFAULT_INTENT: &str = "exploring";

pub(super) const PRIORITY: &[&str] = &[
    "dropped_off",
    "inactive",
    "activated",
    "ready_to_onboard",
    "facing_issues",
    "needs_support",
    "interested",
    "confused",
    "followed_up",
    "exploring",
];

pub(super) const PATTERNS: &[(&str, &[&str])] = &[
    (
        "exploring",
        &[
            r"looking into",
            r"considering",
            r"thinking about",
            r"tell me more",
            r"want to know",
            r"checked.*reviews",
            r"read.*fine print",
            r"found.*plan",
            r"checking.*coverage",
            r"researching",
            r"comparing",
            r"looking at",
            r"reading about",
            r"studying.*terms",
            r"investigating",
            r"exploring",
            r"reviewing",
            r"searching for",
            // loans and credit
            r"interest.*rate",
            r"loan.*process",
            r"credit.*score",
            r"approval.*time",
            r"processing.*fee",
            r"hidden.*charge",
            r"fine.*print",
            r"loan.*term",
            r"repayment.*period",
            r"loan.*type",
            r"credit.*check",
            // platform questions
            r"what is (this|the|your) (platform|app|program|service|scheme)",
            r"how does (this|it|your platform) work",
            r"benefits of joining",
            r"wondering about",
        ],
    ),
    (
        "interested",
        &[
            r"could be.*safety net",
            r"might be worth",
            r"responsible move",
            r"need.*coverage",
            r"emergency.*savings",
            r"protect.*savings",
            r"after covid",
            r"medical emergency",
            r"considering it",
            r"sounds.*good",
            r"interested",
            r"want to try",
            r"would like to",
            r"makes sense",
            r"good.*protection",
            r"seems.*helpful",
            r"worth.*investment",
            // loans and credit
            r"ready.*apply",
            r"want.*loan",
            r"need.*loan",
            r"looking.*borrow",
            r"planning.*take.*loan",
            r"thinking.*apply",
            r"want.*credit",
            r"need.*credit",
            r"improve.*credit.*score",
            r"build.*credit.*history",
            // earnings
            r"how much can i earn",
            r"earning potential",
            r"looks promising",
        ],
    ),
    (
        "confused",
        &[
            r"not clear",
            r"confused",
            r"don't understand",
            r"what do you mean",
            r"unclear",
            r"how does that work",
            r"explain this",
            r"clarify",
            r"bit confused",
            r"not sure how",
            r"what.*mean by",
            r"need clarification",
            r"hard to understand",
            r"complicated",
            r"confusing",
            r"gets confusing",
            r"fine print.*confusing",
            r"terms.*unclear",
            r"policy.*complicated",
            r"coverage.*confusing",
            r"exclusions.*unclear",
            r"benefits.*not clear",
            r"don't get.*terms",
            r"clauses.*confusing",
            r"conditions.*unclear",
            // loans and credit
            r"interest.*calculation",
            r"credit.*score.*work",
            r"loan.*process.*confusing",
            r"approval.*process.*unclear",
            r"charges.*unclear",
            r"fees.*confusing",
            r"repayment.*terms.*unclear",
            r"credit.*report.*confusing",
            r"you lost me",
            r"makes no sense",
            r"not sure i follow",
        ],
    ),
    (
        "needs_support",
        &[
            r"help",
            r"support",
            r"assist",
            r"guide",
            r"show me",
            r"how to",
            r"can you help",
            r"need assistance",
            r"help me.*understand",
            r"guide me through",
            r"walk me through",
            r"need help with",
            r"assistance.*with",
            r"support.*with",
            r"explain.*coverage",
            r"clarify.*terms",
            r"help.*understand.*policy",
            r"assistance.*claim",
            r"guide.*through.*process",
            r"support.*filing",
            r"help.*choose.*plan",
            r"advice.*coverage",
            r"recommendation.*policy",
            r"suggestion.*plan",
            // loans and credit
            r"help.*loan.*application",
            r"assist.*credit.*check",
            r"guide.*loan.*process",
            r"explain.*interest.*rate",
            r"help.*understand.*terms",
            r"support.*documentation",
            r"assist.*paperwork",
            r"help.*improve.*score",
            r"can'?t figure out",
        ],
    ),
    (
        "facing_issues",
        &[
            r"premium.*too high",
            r"coverage.*inadequate",
            r"claim.*rejected",
            r"denied.*claim",
            r"exclusions.*too many",
            r"terms.*unfair",
            r"expensive.*premium",
            r"high.*cost",
            r"difficult.*claim",
            r"problems.*approval",
            r"issues.*coverage",
            r"limitations.*policy",
            r"restrictions.*coverage",
            r"gaps.*protection",
            r"loopholes.*policy",
            r"struggle.*claims",
            r"fight to get",
            r"not worth",
            r"too expensive",
            r"keeps going up",
            r"no guarantee",
            r"excludes.*diseases",
            r"paying.*lakhs",
            r"long-term trap",
            r"stress point",
            // loans and credit
            r"interest.*too high",
            r"processing.*fee.*high",
            r"loan.*rejected",
            r"credit.*score.*low",
            r"application.*denied",
            r"approval.*delayed",
            r"documentation.*issue",
            r"repayment.*issue",
            r"hidden.*charges",
            r"unexpected.*fees",
            // platform problems
            r"having trouble",
            r"problem with my",
            r"stuck at",
            r"keeps crashing",
            r"not loading",
            r"payment failed",
            r"can'?t log ?in",
            r"error code",
        ],
    ),
    (
        "activated",
        &[
            r"got.*coverage",
            r"signed.*policy",
            r"completed.*application",
            r"activated.*policy",
            r"began.*coverage",
            r"successfully.*enrolled",
            r"already.*insured",
            r"policy.*active",
            r"coverage.*started",
            r"got.*approved",
            r"successfully.*registered",
            r"protection.*place",
            r"plan.*active",
            r"finished.*enrollment",
            r"completed.*registration",
            r"fully.*covered",
            r"setup.*complete",
            r"made.*payment",
            r"processed.*premium",
            r"account.*active",
            r"using.*coverage",
            r"policy.*effect",
            r"enrollment.*done",
            r"paperwork.*completed",
            r"ready.*covered",
            r"actively.*insured",
            // platform milestones
            r"first (sale|commission|transaction)",
            r"made \d+ sales",
            r"started using",
            r"fully onboarded",
            r"finished.*onboarding",
        ],
    ),
    (
        "inactive",
        &[
            r"not.*covered",
            r"haven't.*enrolled",
            r"no.*policy.*yet",
            r"not.*insured",
            r"busy with",
            r"haven't.*decided",
            r"not.*started",
            r"yet to.*enroll",
            r"still.*waiting",
            r"been too busy",
            r"no.*coverage",
            r"haven't.*applied",
            r"didn't.*sign up",
            r"not.*protected.*yet",
            r"too busy.*to.*enroll",
            r"no time.*to.*apply",
            r"will.*enroll.*later",
            r"start.*next.*month",
            r"need more time",
            r"haven't.*registered",
            r"haven't.*submitted",
            r"applied.*but.*not.*approved",
            r"registered.*but.*not.*active",
            r"signed up.*but.*haven't.*paid",
            r"coverage.*inactive",
            r"taking.*break",
            r"paused.*application",
            // platform inactivity
            r"haven'?t started",
            r"no sales yet",
            r"haven'?t had time",
        ],
    ),
    (
        "ready_to_onboard",
        &[
            r"ready to.*apply",
            r"let's.*enroll",
            r"want to.*sign up",
            r"sign me up",
            r"how do (i|we).*enroll",
            r"begin.*application",
            r"get.*coverage",
            r"start.*process",
            r"ready to.*register",
            r"want to.*enroll",
            r"begin.*now",
            r"apply.*right away",
            r"sign.*up.*now",
            r"where do.*apply",
            r"ready to start",
            r"let'?s begin",
            r"want to join",
        ],
    ),
    (
        "followed_up",
        &[
            r"following up",
            r"checking back",
            r"as discussed",
            r"regarding our last",
            r"about our previous",
            r"last.*conversation",
            r"previous.*discussion",
            r"discussed yesterday",
            r"our chat",
            r"our call",
            r"earlier.*conversation",
            r"mentioned earlier",
            r"follow.*up.*on",
            r"getting back.*about",
        ],
    ),
    (
        "dropped_off",
        &[
            r"not interested",
            r"quit",
            r"stop",
            r"cancel",
            r"remove",
            r"don't contact",
            r"won't be proceeding",
            r"no longer.*interested",
            r"changed.*mind",
            r"too expensive",
            r"can't afford",
            r"not worth",
            r"doesn't seem safe",
            r"don't trust",
            r"seems like.*scam",
            r"not.*looking for",
            r"remove.*from.*list",
            r"isn't for me",
            r"not for me",
            r"cancel.*policy",
            r"delete.*application",
            r"opt out",
            r"rather.*save.*myself",
            r"better without.*insurance",
            r"waste.*money",
            r"found better.*alternative",
            r"going with.*different.*provider",
            r"terms.*unacceptable",
        ],
    ),
];
