//! Reconstruction low-pass (scaling) filters for the orthogonal wavelet families
//!
//! Values are the normalized scaling coefficients (sum = sqrt 2). The other
//! three filters of each bank are derived from these.

pub(crate) const DB1: [f64; 2] = [
    0.7071067811865476,
    0.7071067811865476,
];

pub(crate) const DB2: [f64; 4] = [
    0.48296291314453416,
    0.8365163037378079,
    0.2241438680420134,
    -0.12940952255126037,
];

pub(crate) const DB3: [f64; 6] = [
    0.33267055295008263,
    0.8068915093110925,
    0.45987750211849154,
    -0.13501102001025458,
    -0.08544127388202666,
    0.03522629188570953,
];

pub(crate) const DB4: [f64; 8] = [
    0.2303778133088965,
    0.7148465705529157,
    0.6308807679298589,
    -0.027983769416859854,
    -0.18703481171909309,
    0.030841381835560764,
    0.0328830116668852,
    -0.010597401785069032,
];

pub(crate) const DB5: [f64; 10] = [
    0.16010239797419293,
    0.6038292697971896,
    0.7243085284377729,
    0.13842814590132074,
    -0.24229488706638203,
    -0.032244869584638375,
    0.07757149384004572,
    -0.006241490212798274,
    -0.012580751999081999,
    0.0033357252854737712,
];

pub(crate) const DB6: [f64; 12] = [
    0.11154074335010947,
    0.49462389039845306,
    0.7511339080210954,
    0.31525035170919763,
    -0.22626469396543983,
    -0.12976686756726194,
    0.09750160558732304,
    0.027522865530305727,
    -0.03158203931748603,
    0.0005538422011614961,
    0.004777257510945511,
    -0.0010773010853084796,
];

pub(crate) const DB7: [f64; 14] = [
    0.07785205408500918,
    0.3965393194819173,
    0.7291320908462351,
    0.4697822874051931,
    -0.14390600392856498,
    -0.22403618499387498,
    0.07130921926683026,
    0.08061260915108308,
    -0.03802993693501441,
    -0.01657454163066688,
    0.01255099855609984,
    0.0004295779729213665,
    -0.0018016407040474908,
    0.00035371379997452024,
];

pub(crate) const DB8: [f64; 16] = [
    0.05441584224310401,
    0.31287159091429995,
    0.6756307362972898,
    0.5853546836542067,
    -0.015829105256349306,
    -0.2840155429615469,
    0.0004724845739132828,
    0.12874742662047847,
    -0.017369301001807547,
    -0.044088253930794755,
    0.013981027917398282,
    0.008746094047405777,
    -0.004870352993451574,
    -0.00039174037337694705,
    0.0006754494064505693,
    -0.00011747678412476953,
];

pub(crate) const DB9: [f64; 18] = [
    0.038077947363878345,
    0.24383467461259034,
    0.6048231236901112,
    0.6572880780513005,
    0.13319738582500756,
    -0.2932737832791749,
    -0.09684078322297646,
    0.14854074933810638,
    0.03072568147933338,
    -0.06763282906132997,
    0.00025094711483145197,
    0.022361662123679096,
    -0.004723204757751397,
    -0.00428150368246343,
    0.0018476468830562265,
    0.00023038576352319597,
    -0.0002519631889427101,
    3.93473203162716e-05,
];

pub(crate) const DB10: [f64; 20] = [
    0.026670057900555554,
    0.1881768000776915,
    0.5272011889317256,
    0.6884590394536035,
    0.2811723436605775,
    -0.24984642432731538,
    -0.19594627437737705,
    0.12736934033579325,
    0.09305736460357235,
    -0.07139414716639708,
    -0.029457536821875813,
    0.033212674059341,
    0.0036065535669561697,
    -0.010733175483330575,
    0.001395351747052901,
    0.001992405295185056,
    -0.0006858566949597116,
    -0.00011646685512928545,
    9.358867032006959e-05,
    -1.3264202894521244e-05,
];

pub(crate) const SYM4: [f64; 8] = [
    0.032223100604051466,
    -0.012603967262031304,
    -0.09921954357663353,
    0.29785779560530606,
    0.8037387518051321,
    0.497618667632775,
    -0.029635527646002493,
    -0.07576571478950221,
];

pub(crate) const SYM5: [f64; 10] = [
    0.027333068344998768,
    0.02951949092570626,
    -0.039134249302313844,
    0.19939753397685558,
    0.7234076904040407,
    0.633978963456792,
    0.01660210576451085,
    -0.17532808990805623,
    -0.021101834024689042,
    0.019538882735249827,
];

pub(crate) const SYM6: [f64; 12] = [
    0.015404109327044824,
    0.0034907120842221626,
    -0.11799011114852002,
    -0.04831174258569806,
    0.49105594192797375,
    0.787641141028651,
    0.3379294217281658,
    -0.07263752278637658,
    -0.02106029251237085,
    0.04472490177078139,
    0.0017677118642540077,
    -0.00780070832503238,
];

pub(crate) const SYM7: [f64; 14] = [
    0.07785205408500918,
    0.3965393194819173,
    0.7291320908462351,
    0.4697822874051931,
    -0.14390600392856498,
    -0.22403618499387498,
    0.07130921926683026,
    0.08061260915108308,
    -0.03802993693501441,
    -0.01657454163066688,
    0.01255099855609984,
    0.0004295779729213665,
    -0.0018016407040474908,
    0.00035371379997452024,
];

pub(crate) const SYM8: [f64; 16] = [
    0.002273363291843112,
    0.0021948620922243667,
    -0.007815655221774563,
    0.017824408138294088,
    0.07751841927970034,
    0.03022005499843186,
    0.031642421046609505,
    0.4283615917939548,
    0.7653633377820792,
    0.3942752520859951,
    -0.1608468807546481,
    -0.19933749673914436,
    -0.0037430812221492743,
    0.03638006508224975,
    0.0027148569848873347,
    -0.0028119562654580796,
];

pub(crate) const SYM9: [f64; 18] = [
    0.001069490032908612,
    -0.00047315449868004354,
    -0.010264064027633121,
    0.008859267493400267,
    0.062077789302885746,
    -0.018233770779395506,
    -0.19155083129728434,
    0.03527248803527104,
    0.6173384491409342,
    0.7178970827644124,
    0.23876091460730517,
    -0.05456895843083335,
    0.0005834627461249819,
    0.030224878858275187,
    -0.011528210207679187,
    -0.013271967781817134,
    0.0006197808889855071,
    0.0014009155259146562,
];

pub(crate) const SYM10: [f64; 20] = [
    0.0006254503740986706,
    -0.0006029865297042038,
    -0.00869108650575602,
    0.004617880036739375,
    0.05914918829699318,
    0.008255257113132814,
    -0.21987021525492687,
    -0.19018914666822165,
    0.36158735345352894,
    0.7479102922295816,
    0.4565282791786035,
    0.06570054435831948,
    0.03865688251686771,
    0.08287833162992385,
    0.01957202886296458,
    -0.014523370186513243,
    9.418960979851445e-05,
    0.003625582924785977,
    -0.0005452893456246697,
    -0.0005656037214965191,
];
